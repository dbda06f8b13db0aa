//! Admin API 帮助函数

use actix_web::HttpResponse;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::StatusCode;
use serde::Serialize;

use crate::api::constants;
use crate::config::SameSitePolicy;
use crate::errors::HalalmapError;

use super::error_code::ErrorCode;
use super::types::ApiResponse;

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse {
            code: code as i32,
            message: message.into(),
            data,
        })
}

/// 构建成功响应
pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(data))
}

/// 构建错误响应
pub fn error_response(status: StatusCode, error_code: ErrorCode, message: &str) -> HttpResponse {
    json_response::<()>(status, error_code, message, None)
}

/// 从 HalalmapError 构建错误响应（自动映射 HTTP 状态码和 ErrorCode）
pub fn error_from_halalmap(err: &HalalmapError) -> HttpResponse {
    let status = err.http_status();
    let error_code = ErrorCode::from(err.clone());
    error_response(status, error_code, err.message())
}

/// 统一 Result → HttpResponse 转换
///
/// 成功时返回 200 OK + JSON 数据，失败时自动映射 HalalmapError。
pub fn api_result<T, E>(result: Result<T, E>) -> HttpResponse
where
    T: Serialize,
    E: Into<HalalmapError>,
{
    match result {
        Ok(data) => success_response(data),
        Err(e) => {
            let err: HalalmapError = e.into();
            error_from_halalmap(&err)
        }
    }
}

/// Cookie 构建器，消除重复的 cookie 创建代码
pub struct CookieBuilder {
    same_site: SameSite,
    secure: bool,
    domain: Option<String>,
    access_token_hours: u64,
}

impl CookieBuilder {
    pub fn from_config() -> Self {
        let config = crate::config::get_config();

        let same_site = match config.api.cookie_same_site {
            SameSitePolicy::Strict => SameSite::Strict,
            SameSitePolicy::None => SameSite::None,
            SameSitePolicy::Lax => SameSite::Lax,
        };

        Self {
            same_site,
            secure: config.api.cookie_secure,
            domain: config.api.cookie_domain.clone(),
            access_token_hours: config.api.access_token_hours,
        }
    }

    fn build_cookie_base(
        &self,
        name: String,
        value: String,
        max_age: actix_web::cookie::time::Duration,
    ) -> Cookie<'static> {
        let mut cookie = Cookie::new(name, value);
        cookie.set_path("/".to_string());
        cookie.set_http_only(true);
        cookie.set_secure(self.secure);
        cookie.set_same_site(self.same_site);
        cookie.set_max_age(max_age);
        if let Some(ref domain) = self.domain {
            cookie.set_domain(domain.clone());
        }
        cookie
    }

    pub fn build_access_cookie(&self, token: String) -> Cookie<'static> {
        self.build_cookie_base(
            constants::ACCESS_COOKIE_NAME.to_string(),
            token,
            actix_web::cookie::time::Duration::hours(self.access_token_hours as i64),
        )
    }

    pub fn build_expired_access_cookie(&self) -> Cookie<'static> {
        self.build_cookie_base(
            constants::ACCESS_COOKIE_NAME.to_string(),
            String::new(),
            actix_web::cookie::time::Duration::ZERO,
        )
    }

    pub fn access_token_hours(&self) -> u64 {
        self.access_token_hours
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response() {
        let response = success_response("success_data");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_error_response() {
        let response = error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            "Something went wrong",
        );
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_error_from_halalmap_maps_status() {
        let err = HalalmapError::not_found("Restaurant 'x' not found");
        let response = error_from_halalmap(&err);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let err = HalalmapError::analytics_query_failed("boom");
        let response = error_from_halalmap(&err);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
