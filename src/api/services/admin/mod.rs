//! Admin API 服务模块
//!
//! 该模块包含管理 API 的所有端点，包括：
//! - 认证（登录、登出、token 验证）
//! - 餐厅写操作
//! - 分析统计（dashboard / charts）

pub mod analytics;
pub mod auth;
pub mod error_code;
mod helpers;
mod restaurant_ops;
pub mod routes;
mod types;

// 重新导出类型
pub use types::*;

// 重新导出帮助函数
pub use helpers::{api_result, error_from_halalmap, error_response, success_response};

// 重新导出错误码
pub use error_code::ErrorCode;

// 重新导出认证端点
pub use auth::{login, logout, verify_token};

// 重新导出餐厅写端点
pub use restaurant_ops::{create_restaurant, delete_restaurant, update_restaurant};
