//! Admin API 路由配置

use actix_web::web;

use super::analytics::analytics_routes;
use super::auth::{login, login_rate_limiter, logout, verify_token};
use super::restaurant_ops::{create_restaurant, delete_restaurant, update_restaurant};

/// 认证路由 `/auth`
///
/// 包含：
/// - POST /auth/login - 登录（带限流）
/// - POST /auth/logout - 登出
/// - GET /auth/verify - 验证 token
pub fn auth_routes() -> actix_web::Scope {
    web::scope("/auth")
        .route("/login", web::post().to(login).wrap(login_rate_limiter()))
        .route("/logout", web::post().to(logout))
        .route("/verify", web::get().to(verify_token))
}

/// 餐厅管理路由 `/restaurants`
pub fn restaurants_admin_routes() -> actix_web::Scope {
    web::scope("/restaurants")
        .route("", web::post().to(create_restaurant))
        .route("/{id}", web::put().to(update_restaurant))
        .route("/{id}", web::delete().to(delete_restaurant))
}

/// Admin API v1 路由
///
/// 组合所有子模块路由
pub fn admin_v1_routes() -> actix_web::Scope {
    web::scope("/v1")
        .service(auth_routes())
        .service(restaurants_admin_routes())
        .service(analytics_routes())
}
