//! 分析查询补充索引
//!
//! dashboard / charts 上线后补充的复合索引：
//! - (event_type, timestamp): conversions / filter_use 按时间窗口的分组统计
//! - session_id: 会话事件回溯
//! - restaurant_id: 单餐厅事件查询

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_analytics_events_type_time")
                    .table(AnalyticsEvents::Table)
                    .col(AnalyticsEvents::EventType)
                    .col(AnalyticsEvents::Timestamp)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_analytics_events_session")
                    .table(AnalyticsEvents::Table)
                    .col(AnalyticsEvents::SessionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_analytics_events_restaurant")
                    .table(AnalyticsEvents::Table)
                    .col(AnalyticsEvents::RestaurantId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_analytics_events_restaurant")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_analytics_events_session")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_analytics_events_type_time")
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum AnalyticsEvents {
    #[sea_orm(iden = "analytics_events")]
    Table,
    EventType,
    Timestamp,
    SessionId,
    RestaurantId,
}
