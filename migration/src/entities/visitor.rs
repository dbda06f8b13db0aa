//! Visitor entity: one row per resolved client fingerprint

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "visitors")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Client-derived fingerprint (opaque, unique key)
    #[sea_orm(unique)]
    pub fingerprint: String,
    pub first_seen: DateTimeUtc,
    pub last_seen: DateTimeUtc,
    pub total_sessions: i64,
    pub total_page_views: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
