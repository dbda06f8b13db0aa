pub mod backend;

pub use backend::{SeaOrmStorage, infer_backend_from_url, normalize_backend_name};
