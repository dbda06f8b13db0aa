//! 分析管线表迁移
//!
//! 创建三张核心表：
//! - visitors: 指纹维度的访客，fingerprint 唯一约束支撑原子 upsert
//! - sessions: 客户端 token 主键的浏览会话
//! - analytics_events: 不可变事件日志
//!
//! 表之间不建外键：事件对餐厅是弱引用，餐厅删除不得级联影响
//! 事件写入；visitor/session 的归属靠摄取路径维护。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建 visitors 表
        manager
            .create_table(
                Table::create()
                    .table(Visitors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Visitors::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Visitors::Fingerprint)
                            .string_len(128)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Visitors::FirstSeen)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Visitors::LastSeen)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Visitors::TotalSessions)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Visitors::TotalPageViews)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建 sessions 表
        manager
            .create_table(
                Table::create()
                    .table(Sessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sessions::Id)
                            .string_len(128)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Sessions::VisitorId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Sessions::StartedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Sessions::EndedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Sessions::Duration).big_integer().null())
                    .col(ColumnDef::new(Sessions::UserAgent).text().not_null())
                    .col(ColumnDef::new(Sessions::Device).string_len(16).null())
                    .col(ColumnDef::new(Sessions::Referrer).text().null())
                    .col(ColumnDef::new(Sessions::LandingPage).string_len(512).null())
                    .col(
                        ColumnDef::new(Sessions::PageViews)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Sessions::ExitPage).string_len(512).null())
                    .to_owned(),
            )
            .await?;

        // 创建 analytics_events 表
        manager
            .create_table(
                Table::create()
                    .table(AnalyticsEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AnalyticsEvents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsEvents::VisitorId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsEvents::SessionId)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsEvents::EventType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsEvents::EventName)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(AnalyticsEvents::Page).string_len(512).null())
                    .col(
                        ColumnDef::new(AnalyticsEvents::RestaurantId)
                            .string_len(64)
                            .null(),
                    )
                    .col(ColumnDef::new(AnalyticsEvents::Metadata).json().not_null())
                    .col(
                        ColumnDef::new(AnalyticsEvents::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // sessions.visitor_id 索引（访客会话查询）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_sessions_visitor_id")
                    .table(Sessions::Table)
                    .col(Sessions::VisitorId)
                    .to_owned(),
            )
            .await?;

        // sessions.started_at 索引（时间范围查询）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_sessions_started_at")
                    .table(Sessions::Table)
                    .col(Sessions::StartedAt)
                    .to_owned(),
            )
            .await?;

        // analytics_events.timestamp 索引（时间范围查询）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_analytics_events_timestamp")
                    .table(AnalyticsEvents::Table)
                    .col(AnalyticsEvents::Timestamp)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_analytics_events_timestamp")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(Index::drop().name("idx_sessions_started_at").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_sessions_visitor_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(AnalyticsEvents::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Sessions::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Visitors::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Visitors {
    #[sea_orm(iden = "visitors")]
    Table,
    Id,
    Fingerprint,
    FirstSeen,
    LastSeen,
    TotalSessions,
    TotalPageViews,
}

#[derive(DeriveIden)]
enum Sessions {
    #[sea_orm(iden = "sessions")]
    Table,
    Id,
    VisitorId,
    StartedAt,
    EndedAt,
    Duration,
    UserAgent,
    Device,
    Referrer,
    LandingPage,
    PageViews,
    ExitPage,
}

#[derive(DeriveIden)]
enum AnalyticsEvents {
    #[sea_orm(iden = "analytics_events")]
    Table,
    Id,
    VisitorId,
    SessionId,
    EventType,
    EventName,
    Page,
    RestaurantId,
    Metadata,
    Timestamp,
}
