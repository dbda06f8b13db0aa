//! Restaurant entity with denormalized analytics counters

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "restaurants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text")]
    pub address: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub lat: f64,
    pub lng: f64,
    /// certified / muslim-owned / self-reported
    pub halal_status: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub halal_note: Option<String>,
    /// 1-4
    pub price_range: i32,
    pub rating: Option<f64>,
    pub photos: Json,
    pub cuisines: Json,
    pub features: Json,
    /// { "Mon-Fri": "11:00-22:00", ... }
    pub hours: Json,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    /// 以下四个计数器为事件驱动的单调累加缓存
    pub total_views: i64,
    pub total_directions: i64,
    pub total_calls: i64,
    pub total_website_clicks: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
