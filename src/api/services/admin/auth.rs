//! Admin API 认证相关端点

use actix_governor::{Governor, GovernorConfigBuilder, KeyExtractor, SimpleKeyExtractionError};
use actix_web::dev::ServiceRequest;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, Result as ActixResult, web};
use governor::middleware::NoOpMiddleware;
use tracing::{debug, error, info};

use crate::api::jwt::get_jwt_service;
use crate::config::get_config;
use crate::utils::password::verify_admin_password;

use super::error_code::ErrorCode;
use super::helpers::{CookieBuilder, error_response, success_response};
use super::types::{ApiResponse, AuthSuccessResponse, LoginCredentials, MessageResponse};

/// 基于连接 IP 的限流 key 提取器
///
/// 使用 TCP peer address，无法被请求头伪造。
#[derive(Clone, Copy)]
pub struct LoginKeyExtractor;

impl KeyExtractor for LoginKeyExtractor {
    type Key = String;
    type KeyExtractionError = SimpleKeyExtractionError<&'static str>;

    fn extract(&self, req: &ServiceRequest) -> Result<Self::Key, Self::KeyExtractionError> {
        req.connection_info()
            .peer_addr()
            .map(|ip| ip.to_string())
            .ok_or_else(|| SimpleKeyExtractionError::new("Unable to extract peer IP"))
    }
}

/// 创建登录限流器
///
/// 配置：每秒补充 1 个令牌，突发最多 5 次请求
/// 超限返回 HTTP 429 Too Many Requests
pub fn login_rate_limiter() -> Governor<LoginKeyExtractor, NoOpMiddleware> {
    let config = GovernorConfigBuilder::default()
        .seconds_per_request(1)
        .burst_size(5)
        .key_extractor(LoginKeyExtractor)
        .finish()
        .expect("Invalid rate limit config");

    debug!("Login rate limiter created: 1 req/s, burst 5");
    Governor::new(&config)
}

/// 登录 - 验证共享管理员凭据并签发 cookie token
pub async fn login(
    _req: HttpRequest,
    login_body: web::Json<LoginCredentials>,
) -> ActixResult<impl Responder> {
    let config = get_config();

    if login_body.username != config.api.admin_username {
        error!("Admin API: login failed - unknown username");
        return Ok(error_response(
            StatusCode::UNAUTHORIZED,
            ErrorCode::AuthFailed,
            "Invalid credentials",
        ));
    }

    let password_valid =
        match verify_admin_password(&login_body.password, &config.api.admin_password) {
            Ok(valid) => valid,
            Err(e) => {
                error!("Admin API: password verification error: {}", e);
                return Ok(error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::InternalServerError,
                    "Authentication error",
                ));
            }
        };

    if !password_valid {
        error!("Admin API: login failed - invalid password");
        return Ok(error_response(
            StatusCode::UNAUTHORIZED,
            ErrorCode::AuthFailed,
            "Invalid credentials",
        ));
    }

    info!("Admin API: login successful");

    let jwt_service = get_jwt_service();
    let access_token = match jwt_service.generate_access_token() {
        Ok(token) => token,
        Err(e) => {
            error!("Admin API: failed to generate access token: {}", e);
            return Ok(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalServerError,
                "Failed to generate token",
            ));
        }
    };

    let cookie_builder = CookieBuilder::from_config();
    let access_cookie = cookie_builder.build_access_cookie(access_token);

    Ok(HttpResponse::Ok()
        .cookie(access_cookie)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse {
            code: 0,
            message: "OK".to_string(),
            data: Some(AuthSuccessResponse {
                message: "Login successful".to_string(),
                expires_in: cookie_builder.access_token_hours() * 3600,
            }),
        }))
}

/// 登出 - 清除 cookie
pub async fn logout(_req: HttpRequest) -> ActixResult<impl Responder> {
    info!("Admin API: logout");

    let cookie_builder = CookieBuilder::from_config();
    let access_cookie = cookie_builder.build_expired_access_cookie();

    Ok(HttpResponse::Ok()
        .cookie(access_cookie)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse {
            code: 0,
            message: "OK".to_string(),
            data: Some(MessageResponse {
                message: "Logout successful".to_string(),
            }),
        }))
}

/// 验证 token - 如果中间件放行，则 token 有效
pub async fn verify_token(_req: HttpRequest) -> ActixResult<impl Responder> {
    Ok(success_response(MessageResponse {
        message: "Token is valid".to_string(),
    }))
}
