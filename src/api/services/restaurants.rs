//! 公共餐厅读取端点
//!
//! - GET /api/restaurants?search=&filter=trending|new
//! - GET /api/restaurants/{id}（id 或 slug）

use actix_web::{HttpResponse, Result as ActixResult, web};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::error;

use crate::services::{ListFilter, RestaurantService};

use super::admin::RestaurantResponse;

/// 列表查询参数
#[derive(Debug, Clone, Deserialize)]
pub struct RestaurantListQuery {
    pub search: Option<String>,
    /// trending | new
    pub filter: Option<String>,
}

/// GET /api/restaurants
pub async fn list_restaurants(
    query: web::Query<RestaurantListQuery>,
    service: web::Data<Arc<RestaurantService>>,
) -> ActixResult<HttpResponse> {
    let filter = ListFilter::parse(query.filter.as_deref().unwrap_or(""));
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    Ok(match service.list(search, filter).await {
        Ok(restaurants) => {
            let payload: Vec<RestaurantResponse> = restaurants
                .into_iter()
                .map(RestaurantResponse::from)
                .collect();
            HttpResponse::Ok().json(payload)
        }
        Err(e) => {
            error!("Restaurant list query failed: {}", e);
            HttpResponse::InternalServerError().json(json!({ "error": "Internal error" }))
        }
    })
}

/// GET /api/restaurants/{id}
pub async fn get_restaurant(
    key: web::Path<String>,
    service: web::Data<Arc<RestaurantService>>,
) -> ActixResult<HttpResponse> {
    Ok(match service.get(&key.into_inner()).await {
        Ok(Some(restaurant)) => HttpResponse::Ok().json(RestaurantResponse::from(restaurant)),
        Ok(None) => HttpResponse::NotFound().json(json!({ "error": "Not found" })),
        Err(e) => {
            error!("Restaurant detail query failed: {}", e);
            HttpResponse::InternalServerError().json(json!({ "error": "Internal error" }))
        }
    })
}

/// 餐厅路由配置
pub fn restaurant_routes() -> actix_web::Scope {
    web::scope("/restaurants")
        .route("", web::get().to(list_restaurants))
        .route("/{id}", web::get().to(get_restaurant))
}
