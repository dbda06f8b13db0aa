//! 埋点与公共餐厅端点的 HTTP 层测试
//!
//! 验证对客户端脚本的线上契约：
//! - 缺身份字段 → 400 {"error": ...}
//! - 成功摄取 → {"success": true}
//! - end-session 对不存在的会话也返回 success

use std::sync::{Arc, Once};

use actix_web::{App, test, web};
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;
use tempfile::TempDir;

use halalmap::api::services::{restaurant_routes, track_routes};
use halalmap::config::init_config;
use halalmap::services::{RestaurantService, TrackingService};
use halalmap::storage::SeaOrmStorage;
use migration::entities::{analytics_event, session};

static INIT: Once = Once::new();

fn init_static_config() {
    INIT.call_once(|| {
        init_config();
    });
}

async fn create_storage() -> (Arc<SeaOrmStorage>, TempDir) {
    init_static_config();
    let td = TempDir::new().unwrap();
    let p = td.path().join("api_test.db");
    let u = format!("sqlite://{}?mode=rwc", p.display());
    let s = SeaOrmStorage::new(&u, "sqlite").await.unwrap();
    (Arc::new(s), td)
}

macro_rules! test_app {
    ($storage:expr) => {{
        let tracking = Arc::new(TrackingService::new($storage.clone()));
        let restaurants = Arc::new(RestaurantService::new($storage.clone()));
        test::init_service(
            App::new()
                .app_data(web::Data::new(tracking))
                .app_data(web::Data::new(restaurants))
                .service(
                    web::scope("/api")
                        .service(track_routes())
                        .service(restaurant_routes()),
                ),
        )
        .await
    }};
}

#[actix_web::test]
async fn test_track_missing_identity_is_client_error() {
    let (storage, _td) = create_storage().await;
    let app = test_app!(storage);

    // 缺 visitorId
    let req = test::TestRequest::post()
        .uri("/api/analytics/track")
        .set_json(json!({
            "sessionId": "s1",
            "eventType": "page_view",
            "eventName": "page_view",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    // 缺 sessionId
    let req = test::TestRequest::post()
        .uri("/api/analytics/track")
        .set_json(json!({
            "visitorId": "v1",
            "eventType": "page_view",
            "eventName": "page_view",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    // 空字符串同样算缺失
    let req = test::TestRequest::post()
        .uri("/api/analytics/track")
        .set_json(json!({
            "visitorId": "",
            "sessionId": "s1",
            "eventType": "page_view",
            "eventName": "page_view",
        }))
        .to_request();
    let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp["error"], "Missing visitor or session");

    // 没有任何事件落库
    let count = analytics_event::Entity::find()
        .count(storage.get_db())
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[actix_web::test]
async fn test_track_success_acknowledges_only() {
    let (storage, _td) = create_storage().await;
    let app = test_app!(storage);

    let req = test::TestRequest::post()
        .uri("/api/analytics/track")
        .insert_header(("User-Agent", "Mozilla/5.0 (iPhone) Mobile Safari"))
        .set_json(json!({
            "visitorId": "v1",
            "sessionId": "s1",
            "eventType": "page_view",
            "eventName": "page_view",
            "page": "/",
            "metadata": { "referrer": "", "timestamp": 1754400000000u64 },
        }))
        .to_request();
    let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp, json!({ "success": true }));

    // 会话带上了请求头里的 UA 和设备分类
    let s = session::Entity::find_by_id("s1")
        .one(storage.get_db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(s.device.as_deref(), Some("mobile"));
}

#[actix_web::test]
async fn test_end_session_always_succeeds() {
    let (storage, _td) = create_storage().await;
    let app = test_app!(storage);

    // 会话不存在也返回 success（unload beacon 契约）
    let req = test::TestRequest::post()
        .uri("/api/analytics/end-session")
        .set_json(json!({ "sessionId": "ghost", "duration": 12 }))
        .to_request();
    let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp, json!({ "success": true }));

    // sessionId 缺失同样 success
    let req = test::TestRequest::post()
        .uri("/api/analytics/end-session")
        .set_json(json!({ "duration": 12 }))
        .to_request();
    let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp, json!({ "success": true }));

    // sendBeacon 风格：text/plain + JSON 字符串负载
    let req = test::TestRequest::post()
        .uri("/api/analytics/end-session")
        .insert_header(("Content-Type", "text/plain"))
        .set_payload(r#"{"sessionId":"ghost","duration":5}"#)
        .to_request();
    let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp, json!({ "success": true }));

    let count = session::Entity::find().count(storage.get_db()).await.unwrap();
    assert_eq!(count, 0);
}

#[actix_web::test]
async fn test_restaurant_list_and_detail() {
    let (storage, _td) = create_storage().await;
    let app = test_app!(storage);

    // 空目录
    let req = test::TestRequest::get().uri("/api/restaurants").to_request();
    let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp, json!([]));

    // 未知 id → 404 {"error": "Not found"}
    let req = test::TestRequest::get()
        .uri("/api/restaurants/nope")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}
