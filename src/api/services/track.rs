//! 公共埋点端点
//!
//! - POST /api/analytics/track: 单事件摄取
//! - POST /api/analytics/end-session: 会话关闭 beacon
//!
//! 响应契约面向客户端埋点脚本：`{"success": true}` /
//! `{"error": "..."}`。身份字段缺失是唯一的客户端错误。

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::error;

use crate::services::{IngestRequest, TrackingService};

/// 摄取请求体
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRequest {
    pub visitor_id: Option<String>,
    pub session_id: Option<String>,
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub event_name: String,
    pub page: Option<String>,
    pub restaurant_id: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// 会话关闭请求体
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndSessionRequest {
    pub session_id: Option<String>,
    pub duration: Option<f64>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// POST /api/analytics/track
pub async fn track_event(
    req: HttpRequest,
    body: web::Json<TrackRequest>,
    tracking: web::Data<Arc<TrackingService>>,
) -> ActixResult<HttpResponse> {
    let body = body.into_inner();

    // 身份字段缺失是客户端错误，无重试预期
    let (Some(visitor_id), Some(session_id)) =
        (non_empty(body.visitor_id), non_empty(body.session_id))
    else {
        return Ok(
            HttpResponse::BadRequest().json(json!({ "error": "Missing visitor or session" }))
        );
    };

    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let ingest = IngestRequest {
        visitor_id,
        session_id,
        event_type: body.event_type,
        event_name: body.event_name,
        page: body.page,
        restaurant_id: body.restaurant_id,
        metadata: body.metadata,
        user_agent,
    };

    Ok(match tracking.ingest(ingest).await {
        Ok(()) => HttpResponse::Ok().json(json!({ "success": true })),
        Err(e) => {
            error!("Event ingestion failed: {}", e);
            HttpResponse::InternalServerError().json(json!({ "error": "Internal error" }))
        }
    })
}

/// POST /api/analytics/end-session
///
/// 始终返回 success：调用来自页面卸载 beacon，
/// 会话不存在或已关闭都不是调用方的错误。
/// sendBeacon 以 text/plain 投递，所以不走 Json 提取器，
/// 手动解析并容忍坏负载。
pub async fn end_session(
    body: web::Bytes,
    tracking: web::Data<Arc<TrackingService>>,
) -> ActixResult<HttpResponse> {
    let body: EndSessionRequest = serde_json::from_slice(&body).unwrap_or_default();

    if let Some(session_id) = non_empty(body.session_id) {
        let duration = body.duration.unwrap_or(0.0).max(0.0) as i64;
        tracking.end_session(&session_id, duration).await;
    }

    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

/// 埋点路由配置
pub fn track_routes() -> actix_web::Scope {
    web::scope("/analytics")
        .route("/track", web::post().to(track_event))
        .route("/end-session", web::post().to(end_session))
}
