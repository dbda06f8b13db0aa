//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};
use ts_rs::TS;

use super::types::TS_EXPORT_PATH;

use crate::errors::HalalmapError;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字，ts-rs 自动生成 TypeScript 类型。
/// 按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 2000-2099: 认证错误
/// - 3000-3099: 餐厅错误
/// - 6000-6099: Analytics 错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[ts(rename = "ErrorCode")]
#[ts(repr(enum))]
#[repr(i32)]
pub enum ErrorCode {
    // 成功
    Success = 0,

    // 通用错误 1000-1099
    BadRequest = 1000,
    Unauthorized = 1001,
    NotFound = 1004,
    InternalServerError = 1005,

    // 认证错误 2000-2099
    AuthFailed = 2000,
    RateLimitExceeded = 2004,

    // 餐厅错误 3000-3099
    RestaurantNotFound = 3000,
    RestaurantSlugTaken = 3001,
    RestaurantInvalidData = 3002,

    // Analytics 错误 6000-6099
    AnalyticsQueryFailed = 6000,
    AnalyticsInvalidRange = 6002,
}

impl From<HalalmapError> for ErrorCode {
    fn from(err: HalalmapError) -> Self {
        match err {
            HalalmapError::Validation(_) | HalalmapError::DateParse(_) => ErrorCode::BadRequest,
            HalalmapError::NotFound(_) => ErrorCode::NotFound,
            HalalmapError::AnalyticsQueryFailed(_) => ErrorCode::AnalyticsQueryFailed,
            HalalmapError::AnalyticsInvalidRange(_) => ErrorCode::AnalyticsInvalidRange,
            _ => ErrorCode::InternalServerError,
        }
    }
}
