use actix_web::http::StatusCode;
use std::fmt;

#[derive(Debug, Clone)]
pub enum HalalmapError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Validation(String),
    NotFound(String),
    Serialization(String),
    DateParse(String),
    PasswordHash(String),
    AnalyticsQueryFailed(String),
    AnalyticsInvalidRange(String),
}

impl HalalmapError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            HalalmapError::DatabaseConfig(_) => "E001",
            HalalmapError::DatabaseConnection(_) => "E002",
            HalalmapError::DatabaseOperation(_) => "E003",
            HalalmapError::Validation(_) => "E004",
            HalalmapError::NotFound(_) => "E005",
            HalalmapError::Serialization(_) => "E006",
            HalalmapError::DateParse(_) => "E007",
            HalalmapError::PasswordHash(_) => "E008",
            HalalmapError::AnalyticsQueryFailed(_) => "E009",
            HalalmapError::AnalyticsInvalidRange(_) => "E010",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            HalalmapError::DatabaseConfig(_) => "Database Configuration Error",
            HalalmapError::DatabaseConnection(_) => "Database Connection Error",
            HalalmapError::DatabaseOperation(_) => "Database Operation Error",
            HalalmapError::Validation(_) => "Validation Error",
            HalalmapError::NotFound(_) => "Resource Not Found",
            HalalmapError::Serialization(_) => "Serialization Error",
            HalalmapError::DateParse(_) => "Date Parse Error",
            HalalmapError::PasswordHash(_) => "Password Hash Error",
            HalalmapError::AnalyticsQueryFailed(_) => "Analytics Query Failed",
            HalalmapError::AnalyticsInvalidRange(_) => "Analytics Invalid Range",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            HalalmapError::DatabaseConfig(msg)
            | HalalmapError::DatabaseConnection(msg)
            | HalalmapError::DatabaseOperation(msg)
            | HalalmapError::Validation(msg)
            | HalalmapError::NotFound(msg)
            | HalalmapError::Serialization(msg)
            | HalalmapError::DateParse(msg)
            | HalalmapError::PasswordHash(msg)
            | HalalmapError::AnalyticsQueryFailed(msg)
            | HalalmapError::AnalyticsInvalidRange(msg) => msg,
        }
    }

    /// 映射到 HTTP 状态码（供 Admin API 响应使用）
    pub fn http_status(&self) -> StatusCode {
        match self {
            HalalmapError::Validation(_)
            | HalalmapError::DateParse(_)
            | HalalmapError::AnalyticsInvalidRange(_) => StatusCode::BAD_REQUEST,
            HalalmapError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for HalalmapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for HalalmapError {}

// 便捷的构造函数
impl HalalmapError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        HalalmapError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        HalalmapError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        HalalmapError::DatabaseOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        HalalmapError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        HalalmapError::NotFound(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        HalalmapError::Serialization(msg.into())
    }

    pub fn date_parse<T: Into<String>>(msg: T) -> Self {
        HalalmapError::DateParse(msg.into())
    }

    pub fn password_hash<T: Into<String>>(msg: T) -> Self {
        HalalmapError::PasswordHash(msg.into())
    }

    pub fn analytics_query_failed<T: Into<String>>(msg: T) -> Self {
        HalalmapError::AnalyticsQueryFailed(msg.into())
    }

    pub fn analytics_invalid_range<T: Into<String>>(msg: T) -> Self {
        HalalmapError::AnalyticsInvalidRange(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for HalalmapError {
    fn from(err: sea_orm::DbErr) -> Self {
        HalalmapError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for HalalmapError {
    fn from(err: std::io::Error) -> Self {
        HalalmapError::DatabaseConfig(err.to_string())
    }
}

impl From<serde_json::Error> for HalalmapError {
    fn from(err: serde_json::Error) -> Self {
        HalalmapError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for HalalmapError {
    fn from(err: chrono::ParseError) -> Self {
        HalalmapError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HalalmapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(HalalmapError::validation("x").code(), "E004");
        assert_eq!(HalalmapError::not_found("x").code(), "E005");
        assert_eq!(HalalmapError::analytics_query_failed("x").code(), "E009");
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(
            HalalmapError::validation("bad").http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            HalalmapError::not_found("gone").http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            HalalmapError::database_operation("boom").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_display_format() {
        let err = HalalmapError::validation("missing field");
        assert_eq!(err.to_string(), "Validation Error: missing field");
    }

    #[test]
    fn test_from_db_err() {
        let err: HalalmapError = sea_orm::DbErr::Custom("oops".to_string()).into();
        assert!(matches!(err, HalalmapError::DatabaseOperation(_)));
    }
}
