//! HTTP 服务模块
//!
//! - `track` / `restaurants`: 公共 API（面向前端与埋点脚本）
//! - `admin`: JWT 门禁后的管理 API
//! - `health`: 健康检查

pub mod admin;
pub mod health;
pub mod restaurants;
pub mod track;

pub use health::{AppStartTime, health_check, health_routes};
pub use restaurants::restaurant_routes;
pub use track::track_routes;
