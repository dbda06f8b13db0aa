//! TrackingService 集成测试
//!
//! 覆盖事件摄取的核心不变量：
//! - 访客按指纹唯一，计数器与事件流一致
//! - 会话不重复创建，exit_page 跟随最新事件
//! - 会话关闭幂等安全
//! - 餐厅计数器的 fire-and-forget 语义

use std::sync::{Arc, Once};

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use tempfile::TempDir;

use halalmap::config::init_config;
use halalmap::services::{IngestRequest, NewRestaurant, RestaurantService, TrackingService};
use halalmap::storage::SeaOrmStorage;
use migration::entities::{analytics_event, restaurant, session, visitor};

// =============================================================================
// 全局初始化
// =============================================================================

static INIT: Once = Once::new();

fn init_static_config() {
    INIT.call_once(|| {
        init_config();
    });
}

async fn create_temp_storage() -> (Arc<SeaOrmStorage>, TempDir) {
    init_static_config();
    let td = TempDir::new().unwrap();
    let p = td.path().join("tracking_test.db");
    let u = format!("sqlite://{}?mode=rwc", p.display());
    let s = SeaOrmStorage::new(&u, "sqlite").await.unwrap();
    (Arc::new(s), td)
}

const DESKTOP_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/120.0";
const MOBILE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0) Mobile/15E148 Safari";

fn page_view(visitor: &str, session: &str, page: &str) -> IngestRequest {
    IngestRequest {
        visitor_id: visitor.to_string(),
        session_id: session.to_string(),
        event_type: "page_view".to_string(),
        event_name: "page_view".to_string(),
        page: Some(page.to_string()),
        restaurant_id: None,
        metadata: None,
        user_agent: DESKTOP_UA.to_string(),
    }
}

fn conversion(
    visitor: &str,
    session: &str,
    action: &str,
    restaurant_id: &str,
    page: &str,
) -> IngestRequest {
    IngestRequest {
        visitor_id: visitor.to_string(),
        session_id: session.to_string(),
        event_type: "conversion".to_string(),
        event_name: action.to_string(),
        page: Some(page.to_string()),
        restaurant_id: Some(restaurant_id.to_string()),
        metadata: None,
        user_agent: DESKTOP_UA.to_string(),
    }
}

async fn seed_restaurant(storage: &Arc<SeaOrmStorage>, name: &str) -> restaurant::Model {
    let service = RestaurantService::new(storage.clone());
    service
        .create(NewRestaurant {
            name: name.to_string(),
            slug: None,
            address: "1 Main St".to_string(),
            phone: None,
            website: None,
            lat: 51.5,
            lng: -0.1,
            halal_status: None,
            halal_note: None,
            price_range: None,
            rating: None,
            photos: None,
            cuisines: None,
            features: None,
            hours: None,
        })
        .await
        .unwrap()
}

// =============================================================================
// 访客与会话的核心场景
// =============================================================================

#[tokio::test]
async fn test_page_view_then_conversion_scenario() {
    let (storage, _td) = create_temp_storage().await;
    let tracking = TrackingService::new(storage.clone());
    let r = seed_restaurant(&storage, "Kebab Corner").await;

    tracking
        .ingest(page_view("v1", "s1", "/"))
        .await
        .unwrap();
    tracking
        .ingest(conversion(
            "v1",
            "s1",
            "call_click",
            &r.id,
            &format!("/restaurant/{}", r.id),
        ))
        .await
        .unwrap();

    // Visitor：1 个会话、1 次页面浏览
    let v = visitor::Entity::find()
        .filter(visitor::Column::Fingerprint.eq("v1"))
        .one(storage.get_db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(v.total_sessions, 1);
    assert_eq!(v.total_page_views, 1);

    // Session：pageViews=1，exit_page 跟随转化事件的页面
    let s = session::Entity::find_by_id("s1")
        .one(storage.get_db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(s.visitor_id, v.id);
    assert_eq!(s.page_views, 1);
    assert_eq!(s.exit_page.as_deref(), Some(format!("/restaurant/{}", r.id).as_str()));
    assert_eq!(s.landing_page.as_deref(), Some("/"));

    // Restaurant：call 计数器恰好 +1，其余不动
    let r = restaurant::Entity::find_by_id(r.id.as_str())
        .one(storage.get_db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(r.total_calls, 1);
    assert_eq!(r.total_directions, 0);
    assert_eq!(r.total_website_clicks, 0);
    assert_eq!(r.total_views, 0);

    // 两条事件日志
    let event_count = analytics_event::Entity::find()
        .count(storage.get_db())
        .await
        .unwrap();
    assert_eq!(event_count, 2);
}

#[tokio::test]
async fn test_one_visitor_row_across_sessions() {
    let (storage, _td) = create_temp_storage().await;
    let tracking = TrackingService::new(storage.clone());

    // 同一指纹：3 个会话，4 次 page_view，1 次非 page_view
    tracking.ingest(page_view("v1", "s1", "/")).await.unwrap();
    tracking.ingest(page_view("v1", "s1", "/a")).await.unwrap();
    tracking.ingest(page_view("v1", "s2", "/")).await.unwrap();
    tracking.ingest(page_view("v1", "s3", "/")).await.unwrap();
    tracking
        .ingest(IngestRequest {
            event_type: "filter_use".to_string(),
            event_name: "cuisine".to_string(),
            ..page_view("v1", "s3", "/")
        })
        .await
        .unwrap();

    let visitors = visitor::Entity::find()
        .filter(visitor::Column::Fingerprint.eq("v1"))
        .all(storage.get_db())
        .await
        .unwrap();
    assert_eq!(visitors.len(), 1, "exactly one visitor row per fingerprint");

    let v = &visitors[0];
    assert_eq!(v.total_sessions, 3, "session counter equals distinct session ids");
    assert_eq!(v.total_page_views, 4, "page view counter equals page_view events");
}

#[tokio::test]
async fn test_concurrent_ingest_single_visitor_row() {
    let (storage, _td) = create_temp_storage().await;
    let tracking = Arc::new(TrackingService::new(storage.clone()));

    // 两个"标签页"并发打点同一指纹
    let mut handles = Vec::new();
    for i in 0..8 {
        let t = Arc::clone(&tracking);
        let session = format!("s{}", i % 2);
        handles.push(tokio::spawn(async move {
            t.ingest(page_view("v_concurrent", &session, "/")).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let visitors = visitor::Entity::find()
        .filter(visitor::Column::Fingerprint.eq("v_concurrent"))
        .all(storage.get_db())
        .await
        .unwrap();
    assert_eq!(visitors.len(), 1);
    assert_eq!(visitors[0].total_page_views, 8);
    assert_eq!(visitors[0].total_sessions, 2);

    let sessions = session::Entity::find()
        .filter(session::Column::VisitorId.eq(visitors[0].id))
        .all(storage.get_db())
        .await
        .unwrap();
    assert_eq!(sessions.len(), 2, "no duplicate session rows under races");
}

#[tokio::test]
async fn test_session_reuse_updates_exit_page() {
    let (storage, _td) = create_temp_storage().await;
    let tracking = TrackingService::new(storage.clone());

    tracking.ingest(page_view("v1", "s1", "/")).await.unwrap();
    tracking.ingest(page_view("v1", "s1", "/list")).await.unwrap();
    tracking
        .ingest(page_view("v1", "s1", "/restaurant/x"))
        .await
        .unwrap();

    let sessions = session::Entity::find().all(storage.get_db()).await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].page_views, 3);
    assert_eq!(sessions[0].exit_page.as_deref(), Some("/restaurant/x"));
    // landing_page 只在创建时写入
    assert_eq!(sessions[0].landing_page.as_deref(), Some("/"));
}

#[tokio::test]
async fn test_device_class_from_user_agent() {
    let (storage, _td) = create_temp_storage().await;
    let tracking = TrackingService::new(storage.clone());

    let mut req = page_view("v1", "s_mobile", "/");
    req.user_agent = MOBILE_UA.to_string();
    tracking.ingest(req).await.unwrap();

    tracking.ingest(page_view("v1", "s_desktop", "/")).await.unwrap();

    let mobile = session::Entity::find_by_id("s_mobile")
        .one(storage.get_db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(mobile.device.as_deref(), Some("mobile"));

    let desktop = session::Entity::find_by_id("s_desktop")
        .one(storage.get_db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(desktop.device.as_deref(), Some("desktop"));
}

// =============================================================================
// 会话生命周期
// =============================================================================

#[tokio::test]
async fn test_end_session_records_duration() {
    let (storage, _td) = create_temp_storage().await;
    let tracking = TrackingService::new(storage.clone());

    tracking.ingest(page_view("v1", "s1", "/")).await.unwrap();
    tracking.end_session("s1", 42).await;

    let s = session::Entity::find_by_id("s1")
        .one(storage.get_db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(s.duration, Some(42));
    assert!(s.ended_at.is_some());
}

#[tokio::test]
async fn test_end_session_nonexistent_is_silent() {
    let (storage, _td) = create_temp_storage().await;
    let tracking = TrackingService::new(storage.clone());

    // 不存在的会话：不报错、不创建行
    tracking.end_session("never_seen", 10).await;

    let count = session::Entity::find().count(storage.get_db()).await.unwrap();
    assert_eq!(count, 0);
}

// =============================================================================
// 餐厅计数器副作用
// =============================================================================

#[tokio::test]
async fn test_page_view_with_restaurant_increments_views() {
    let (storage, _td) = create_temp_storage().await;
    let tracking = TrackingService::new(storage.clone());
    let r = seed_restaurant(&storage, "Saffron Grill").await;

    let mut req = page_view("v1", "s1", &format!("/restaurant/{}", r.id));
    req.restaurant_id = Some(r.id.clone());
    tracking.ingest(req).await.unwrap();

    let r = restaurant::Entity::find_by_id(r.id.as_str())
        .one(storage.get_db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(r.total_views, 1);
}

#[tokio::test]
async fn test_conversion_counters_by_action() {
    let (storage, _td) = create_temp_storage().await;
    let tracking = TrackingService::new(storage.clone());
    let r = seed_restaurant(&storage, "Madinah Biryani").await;

    for action in ["directions_click", "call_click", "website_click", "call_click"] {
        tracking
            .ingest(conversion("v1", "s1", action, &r.id, "/r"))
            .await
            .unwrap();
    }

    let r = restaurant::Entity::find_by_id(r.id.as_str())
        .one(storage.get_db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(r.total_directions, 1);
    assert_eq!(r.total_calls, 2);
    assert_eq!(r.total_website_clicks, 1);
}

#[tokio::test]
async fn test_conversion_against_deleted_restaurant_is_silent() {
    let (storage, _td) = create_temp_storage().await;
    let tracking = TrackingService::new(storage.clone());
    let restaurants = RestaurantService::new(storage.clone());

    let r = seed_restaurant(&storage, "Gone Soon").await;
    assert!(restaurants.delete(&r.id).await.unwrap());

    // 已删除餐厅的转化：事件照常落库，计数器副作用静默跳过
    tracking
        .ingest(conversion("v1", "s1", "call_click", &r.id, "/r"))
        .await
        .unwrap();

    let events = analytics_event::Entity::find().all(storage.get_db()).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].restaurant_id.as_deref(), Some(r.id.as_str()));
}

#[tokio::test]
async fn test_unknown_event_name_touches_no_counters() {
    let (storage, _td) = create_temp_storage().await;
    let tracking = TrackingService::new(storage.clone());
    let r = seed_restaurant(&storage, "Untouched").await;

    tracking
        .ingest(conversion("v1", "s1", "share_click", &r.id, "/r"))
        .await
        .unwrap();

    let r = restaurant::Entity::find_by_id(r.id.as_str())
        .one(storage.get_db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(r.total_directions + r.total_calls + r.total_website_clicks, 0);
}

#[tokio::test]
async fn test_referrer_from_metadata_lands_on_session() {
    let (storage, _td) = create_temp_storage().await;
    let tracking = TrackingService::new(storage.clone());

    let mut req = page_view("v1", "s1", "/");
    req.metadata = Some(serde_json::json!({ "referrer": "https://search.example/q" }));
    tracking.ingest(req).await.unwrap();

    let s = session::Entity::find_by_id("s1")
        .one(storage.get_db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(s.referrer.as_deref(), Some("https://search.example/q"));
}
