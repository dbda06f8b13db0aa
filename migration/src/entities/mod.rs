//! 共享实体定义
//!
//! 这些实体同时被主 crate 和迁移 crate 使用。

pub mod analytics_event;
pub mod restaurant;
pub mod session;
pub mod visitor;
