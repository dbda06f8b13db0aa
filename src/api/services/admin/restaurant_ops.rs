//! 餐厅管理端点（创建 / 更新 / 删除）
//!
//! 公共读取端点在 api::services::restaurants；这里只有
//! 需要管理员凭据的写操作。

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use crate::services::{NewRestaurant, RestaurantService, RestaurantUpdate};

use super::error_code::ErrorCode;
use super::helpers::{error_from_halalmap, error_response, success_response};
use super::types::{MessageResponse, RestaurantResponse};

/// POST /admin/v1/restaurants
pub async fn create_restaurant(
    body: web::Json<NewRestaurant>,
    service: web::Data<Arc<RestaurantService>>,
) -> ActixResult<HttpResponse> {
    Ok(match service.create(body.into_inner()).await {
        Ok(created) => success_response(RestaurantResponse::from(created)),
        Err(e) => error_from_halalmap(&e),
    })
}

/// PUT /admin/v1/restaurants/{id}
pub async fn update_restaurant(
    id: web::Path<String>,
    body: web::Json<RestaurantUpdate>,
    service: web::Data<Arc<RestaurantService>>,
) -> ActixResult<HttpResponse> {
    Ok(
        match service.update(&id.into_inner(), body.into_inner()).await {
            Ok(updated) => success_response(RestaurantResponse::from(updated)),
            Err(e) => error_from_halalmap(&e),
        },
    )
}

/// DELETE /admin/v1/restaurants/{id}
pub async fn delete_restaurant(
    id: web::Path<String>,
    service: web::Data<Arc<RestaurantService>>,
) -> ActixResult<HttpResponse> {
    let id = id.into_inner();
    Ok(match service.delete(&id).await {
        Ok(true) => success_response(MessageResponse {
            message: format!("Restaurant '{}' deleted", id),
        }),
        Ok(false) => error_response(
            StatusCode::NOT_FOUND,
            ErrorCode::RestaurantNotFound,
            "Restaurant not found",
        ),
        Err(e) => error_from_halalmap(&e),
    })
}
