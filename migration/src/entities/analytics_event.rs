//! Analytics event entity: immutable per-action log row

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "analytics_events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub visitor_id: i64,
    pub session_id: String,
    /// page_view / filter_use / restaurant_view / conversion
    pub event_type: String,
    /// 自由格式：filter key、directions_click、page_view 等
    pub event_name: String,
    pub page: Option<String>,
    /// 弱引用：餐厅被删除后事件照常保留
    pub restaurant_id: Option<String>,
    pub metadata: Json,
    /// 服务端写入时间戳
    pub timestamp: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
