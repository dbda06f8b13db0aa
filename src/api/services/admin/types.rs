//! Admin API 类型定义

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use migration::entities::restaurant;

/// 输出目录常量
pub const TS_EXPORT_PATH: &str = "../admin-panel/src/services/types.generated.ts";

/// 统一响应包装
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    pub data: Option<T>,
}

/// 登录凭据（共享管理员账号）
#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

/// 登录成功响应
#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct AuthSuccessResponse {
    pub message: String,
    /// access token 有效期（秒）
    pub expires_in: u64,
}

/// 通用消息响应
#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct MessageResponse {
    pub message: String,
}

/// 餐厅响应（公共列表与 Admin CRUD 共用）
#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct RestaurantResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub address: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub halal_status: String,
    pub halal_note: Option<String>,
    pub price_range: i32,
    pub rating: Option<f64>,
    pub photos: serde_json::Value,
    pub cuisines: serde_json::Value,
    pub features: serde_json::Value,
    pub hours: serde_json::Value,
    pub created_at: String,
    pub updated_at: String,
    pub total_views: i64,
    pub total_directions: i64,
    pub total_calls: i64,
    pub total_website_clicks: i64,
}

impl From<restaurant::Model> for RestaurantResponse {
    fn from(r: restaurant::Model) -> Self {
        Self {
            id: r.id,
            name: r.name,
            slug: r.slug,
            address: r.address,
            phone: r.phone,
            website: r.website,
            lat: r.lat,
            lng: r.lng,
            halal_status: r.halal_status,
            halal_note: r.halal_note,
            price_range: r.price_range,
            rating: r.rating,
            photos: r.photos,
            cuisines: r.cuisines,
            features: r.features,
            hours: r.hours,
            created_at: r.created_at.to_rfc3339(),
            updated_at: r.updated_at.to_rfc3339(),
            total_views: r.total_views,
            total_directions: r.total_directions,
            total_calls: r.total_calls,
            total_website_clicks: r.total_website_clicks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{
        ChartsData, DailyBucket, DashboardData, DeviceCount, HourlyBucket, NameCount, NameValue,
        OverviewStats, RecentEvent, TopRestaurant,
    };

    #[test]
    fn export_typescript_types() {
        // 运行此测试会自动生成 TypeScript 类型文件
        // cargo test export_typescript_types -- --nocapture

        // Admin types
        LoginCredentials::export_all(&ts_rs::Config::from_env()).expect("Failed to export LoginCredentials");
        AuthSuccessResponse::export_all(&ts_rs::Config::from_env()).expect("Failed to export AuthSuccessResponse");
        MessageResponse::export_all(&ts_rs::Config::from_env()).expect("Failed to export MessageResponse");
        RestaurantResponse::export_all(&ts_rs::Config::from_env()).expect("Failed to export RestaurantResponse");

        // Analytics types
        OverviewStats::export_all(&ts_rs::Config::from_env()).expect("Failed to export OverviewStats");
        TopRestaurant::export_all(&ts_rs::Config::from_env()).expect("Failed to export TopRestaurant");
        NameCount::export_all(&ts_rs::Config::from_env()).expect("Failed to export NameCount");
        DeviceCount::export_all(&ts_rs::Config::from_env()).expect("Failed to export DeviceCount");
        RecentEvent::export_all(&ts_rs::Config::from_env()).expect("Failed to export RecentEvent");
        DashboardData::export_all(&ts_rs::Config::from_env()).expect("Failed to export DashboardData");
        DailyBucket::export_all(&ts_rs::Config::from_env()).expect("Failed to export DailyBucket");
        HourlyBucket::export_all(&ts_rs::Config::from_env()).expect("Failed to export HourlyBucket");
        NameValue::export_all(&ts_rs::Config::from_env()).expect("Failed to export NameValue");
        ChartsData::export_all(&ts_rs::Config::from_env()).expect("Failed to export ChartsData");

        println!("TypeScript types exported to {}", TS_EXPORT_PATH);
    }
}
