//! 健康检查端点

use actix_web::{HttpResponse, Result as ActixResult, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::storage::SeaOrmStorage;

/// 应用启动时间（注入到 app_data）
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: DateTime<Utc>,
}

#[derive(Serialize)]
struct StorageCheck {
    status: &'static str,
    backend: String,
}

#[derive(Serialize)]
struct HealthChecks {
    storage: StorageCheck,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
    uptime: u64,
    checks: HealthChecks,
}

/// GET /health
pub async fn health_check(
    storage: web::Data<Arc<SeaOrmStorage>>,
    start_time: web::Data<AppStartTime>,
) -> ActixResult<HttpResponse> {
    let storage_ok = storage.get_db().ping().await.is_ok();

    let response = HealthResponse {
        status: if storage_ok { "ok" } else { "degraded" },
        timestamp: Utc::now().to_rfc3339(),
        uptime: (Utc::now() - start_time.start_datetime).num_seconds().max(0) as u64,
        checks: HealthChecks {
            storage: StorageCheck {
                status: if storage_ok { "ok" } else { "error" },
                backend: storage.get_backend_name().to_string(),
            },
        },
    };

    let mut builder = if storage_ok {
        HttpResponse::Ok()
    } else {
        HttpResponse::ServiceUnavailable()
    };
    Ok(builder.json(response))
}

/// 健康检查路由配置
pub fn health_routes() -> actix_web::Scope {
    actix_web::web::scope("/health")
        .route("", web::get().to(health_check))
        .route("", web::head().to(health_check))
}
