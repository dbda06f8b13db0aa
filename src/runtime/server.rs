//! Server mode
//!
//! This module contains the HTTP server startup logic.
//! It configures and starts the HTTP server with all necessary routes.

use actix_cors::Cors;
use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::middleware::AdminAuth;
use crate::api::services::{
    AppStartTime, admin::routes::admin_v1_routes, health_routes, restaurant_routes, track_routes,
};
use crate::services::{AnalyticsService, RestaurantService, TrackingService};
use crate::storage::{SeaOrmStorage, infer_backend_from_url, normalize_backend_name};

/// Build CORS middleware from configuration
///
/// 为空表示仅同源（浏览器默认策略），不开任何跨域。
fn build_cors_middleware(allowed_origins: &[String]) -> Cors {
    if allowed_origins.is_empty() {
        return Cors::default();
    }

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec!["Content-Type", "Authorization", "Accept"])
        .max_age(3600);

    if allowed_origins.iter().any(|o| o == "*") {
        cors = cors.allow_any_origin();
    } else {
        for origin in allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}

/// Run the HTTP server
///
/// This function:
/// 1. Records startup time
/// 2. Connects storage and runs migrations
/// 3. Wires up services and routes
/// 4. Starts the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    // Record application start time
    let app_start_time = AppStartTime {
        start_datetime: chrono::Utc::now(),
    };

    let config = crate::config::get_config();

    // Connect storage (runs migrations)
    let backend = normalize_backend_name(&infer_backend_from_url(
        &config.database.database_url,
    )?);
    let storage = Arc::new(SeaOrmStorage::new(&config.database.database_url, &backend).await?);

    // Wire up services
    let tracking_service = Arc::new(TrackingService::new(storage.clone()));
    let analytics_service = Arc::new(AnalyticsService::new(storage.clone()));
    let restaurant_service = Arc::new(RestaurantService::new(storage.clone()));

    // 检查 Admin API 是否启用
    if config.api.admin_password.is_empty() {
        info!("Admin API is disabled (api.admin_password not set)");
    } else {
        info!("Admin API available at: {}", config.api.admin_prefix);
    }

    let admin_prefix = config.api.admin_prefix.clone();
    let cors_origins = config.api.cors_allowed_origins.clone();
    let cpu_count = config.server.cpu_count.min(32);
    warn!("Using {} CPU cores for the server", cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);

    HttpServer::new(move || {
        let cors = build_cors_middleware(&cors_origins);

        App::new()
            .wrap(cors)
            .wrap(Compress::default())
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(tracking_service.clone()))
            .app_data(web::Data::new(analytics_service.clone()))
            .app_data(web::Data::new(restaurant_service.clone()))
            .app_data(web::Data::new(app_start_time.clone()))
            .app_data(web::PayloadConfig::new(1024 * 1024))
            .wrap(
                DefaultHeaders::new()
                    .add(("Connection", "keep-alive"))
                    .add(("Cache-Control", "no-cache, no-store, must-revalidate")),
            )
            .service(
                web::scope("/api")
                    .service(track_routes())
                    .service(restaurant_routes()),
            )
            .service(
                web::scope(&admin_prefix)
                    .wrap(AdminAuth)
                    .service(admin_v1_routes()),
            )
            .service(health_routes())
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .workers(cpu_count)
    .bind(bind_address)?
    .run()
    .await?;

    Ok(())
}
