//! Admin API 集成测试（访问门禁 + 分析端点）
//!
//! 独立测试二进制：通过环境变量注入管理员凭据和 JWT 密钥，
//! 走完整的登录 → cookie → dashboard/charts 链路。

use std::net::SocketAddr;
use std::sync::{Arc, Once};

use actix_web::{App, test, web};
use serde_json::json;
use tempfile::TempDir;

use halalmap::api::jwt::get_jwt_service;
use halalmap::api::middleware::AdminAuth;
use halalmap::api::services::admin::routes::admin_v1_routes;
use halalmap::config::init_config;
use halalmap::services::{AnalyticsService, RestaurantService, TrackingService};
use halalmap::storage::SeaOrmStorage;

const ADMIN_PASSWORD: &str = "correct-horse-battery";

static INIT: Once = Once::new();

fn init_admin_config() {
    INIT.call_once(|| {
        // 必须在 init_config 之前注入；整个测试二进制共享这份配置
        unsafe {
            std::env::set_var("HM__API__ADMIN_USERNAME", "admin");
            std::env::set_var("HM__API__ADMIN_PASSWORD", ADMIN_PASSWORD);
            std::env::set_var("HM__API__JWT_SECRET", "test_jwt_secret_32_bytes_long!!!");
        }
        init_config();
    });
}

async fn create_storage() -> (Arc<SeaOrmStorage>, TempDir) {
    init_admin_config();
    let td = TempDir::new().unwrap();
    let p = td.path().join("admin_api_test.db");
    let u = format!("sqlite://{}?mode=rwc", p.display());
    let s = SeaOrmStorage::new(&u, "sqlite").await.unwrap();
    (Arc::new(s), td)
}

macro_rules! admin_app {
    ($storage:expr) => {{
        let tracking = Arc::new(TrackingService::new($storage.clone()));
        let analytics = Arc::new(AnalyticsService::new($storage.clone()));
        let restaurants = Arc::new(RestaurantService::new($storage.clone()));
        test::init_service(
            App::new()
                .app_data(web::Data::new(tracking))
                .app_data(web::Data::new(analytics))
                .app_data(web::Data::new(restaurants))
                .service(
                    web::scope("/admin")
                        .wrap(AdminAuth)
                        .service(admin_v1_routes()),
                ),
        )
        .await
    }};
}

fn peer() -> SocketAddr {
    "127.0.0.1:34567".parse().unwrap()
}

#[actix_web::test]
async fn test_dashboard_requires_authentication() {
    let (storage, _td) = create_storage().await;
    let app = admin_app!(storage);

    let req = test::TestRequest::get()
        .uri("/admin/v1/analytics/dashboard")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_login_rejects_bad_credentials() {
    let (storage, _td) = create_storage().await;
    let app = admin_app!(storage);

    let req = test::TestRequest::post()
        .uri("/admin/v1/auth/login")
        .peer_addr(peer())
        .set_json(json!({ "username": "admin", "password": "wrong" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let req = test::TestRequest::post()
        .uri("/admin/v1/auth/login")
        .peer_addr(peer())
        .set_json(json!({ "username": "root", "password": ADMIN_PASSWORD }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_login_issues_cookie_and_gates_open() {
    let (storage, _td) = create_storage().await;
    let app = admin_app!(storage);

    let req = test::TestRequest::post()
        .uri("/admin/v1/auth/login")
        .peer_addr(peer())
        .set_json(json!({ "username": "admin", "password": ADMIN_PASSWORD }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == "halalmap_admin")
        .expect("login must set the admin cookie")
        .into_owned();

    // cookie 换 dashboard
    let req = test::TestRequest::get()
        .uri("/admin/v1/analytics/dashboard")
        .cookie(cookie.clone())
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["code"], 0);
    assert!(body["data"]["overview"].is_object());
    assert_eq!(body["data"]["overview"]["totalVisitors"], 0);

    // verify 端点在门禁之后
    let req = test::TestRequest::get()
        .uri("/admin/v1/auth/verify")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
}

#[actix_web::test]
async fn test_bearer_token_is_accepted() {
    let (storage, _td) = create_storage().await;
    let app = admin_app!(storage);

    let token = get_jwt_service().generate_access_token().unwrap();

    let req = test::TestRequest::get()
        .uri("/admin/v1/analytics/charts?range=30d")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["code"], 0);
    let daily = body["data"]["daily"].as_array().unwrap();
    assert_eq!(daily.len(), 30);
    let weekly = body["data"]["weekly"].as_array().unwrap();
    assert_eq!(weekly.len(), 5);
    let hourly = body["data"]["hourly"].as_array().unwrap();
    assert_eq!(hourly.len(), 24);
}

#[actix_web::test]
async fn test_charts_default_range_is_7d() {
    let (storage, _td) = create_storage().await;
    let app = admin_app!(storage);

    let token = get_jwt_service().generate_access_token().unwrap();
    let req = test::TestRequest::get()
        .uri("/admin/v1/analytics/charts")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["data"]["daily"].as_array().unwrap().len(), 7);
}

#[actix_web::test]
async fn test_invalid_token_rejected_uniformly() {
    let (storage, _td) = create_storage().await;
    let app = admin_app!(storage);

    let req = test::TestRequest::get()
        .uri("/admin/v1/analytics/dashboard")
        .insert_header(("Authorization", "Bearer not.a.token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_admin_restaurant_crud_round_trip() {
    let (storage, _td) = create_storage().await;
    let app = admin_app!(storage);

    let token = get_jwt_service().generate_access_token().unwrap();
    let auth = ("Authorization", format!("Bearer {}", token));

    // 创建
    let req = test::TestRequest::post()
        .uri("/admin/v1/restaurants")
        .insert_header(auth.clone())
        .set_json(json!({
            "name": "Lahori Karahi",
            "address": "7 Market Road",
            "lat": 53.48,
            "lng": -2.24,
            "cuisines": ["Pakistani"],
        }))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["slug"], "lahori-karahi");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    // 更新
    let req = test::TestRequest::put()
        .uri(&format!("/admin/v1/restaurants/{}", id))
        .insert_header(auth.clone())
        .set_json(json!({ "priceRange": 3 }))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["priceRange"], 3);

    // 删除，再删一次 → 404
    let req = test::TestRequest::delete()
        .uri(&format!("/admin/v1/restaurants/{}", id))
        .insert_header(auth.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let req = test::TestRequest::delete()
        .uri(&format!("/admin/v1/restaurants/{}", id))
        .insert_header(auth)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}
