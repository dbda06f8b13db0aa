//! 餐厅表迁移
//!
//! 创建 restaurants 表，包含目录字段和四个分析计数器
//! （total_views / total_directions / total_calls / total_website_clicks）。
//! 计数器由事件摄取同步累加，是可由事件日志重建的派生缓存。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Restaurants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Restaurants::Id)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Restaurants::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Restaurants::Slug)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Restaurants::Address).text().not_null())
                    .col(ColumnDef::new(Restaurants::Phone).string_len(32).null())
                    .col(ColumnDef::new(Restaurants::Website).string_len(512).null())
                    .col(ColumnDef::new(Restaurants::Lat).double().not_null())
                    .col(ColumnDef::new(Restaurants::Lng).double().not_null())
                    .col(
                        ColumnDef::new(Restaurants::HalalStatus)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Restaurants::HalalNote).text().null())
                    .col(ColumnDef::new(Restaurants::PriceRange).integer().not_null())
                    .col(ColumnDef::new(Restaurants::Rating).double().null())
                    .col(ColumnDef::new(Restaurants::Photos).json().not_null())
                    .col(ColumnDef::new(Restaurants::Cuisines).json().not_null())
                    .col(ColumnDef::new(Restaurants::Features).json().not_null())
                    .col(ColumnDef::new(Restaurants::Hours).json().not_null())
                    .col(
                        ColumnDef::new(Restaurants::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Restaurants::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Restaurants::TotalViews)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Restaurants::TotalDirections)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Restaurants::TotalCalls)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Restaurants::TotalWebsiteClicks)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        // total_views 索引（用于 top restaurants 查询）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_restaurants_total_views")
                    .table(Restaurants::Table)
                    .col(Restaurants::TotalViews)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_restaurants_total_views")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Restaurants::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Restaurants {
    #[sea_orm(iden = "restaurants")]
    Table,
    Id,
    Name,
    Slug,
    Address,
    Phone,
    Website,
    Lat,
    Lng,
    HalalStatus,
    HalalNote,
    PriceRange,
    Rating,
    Photos,
    Cuisines,
    Features,
    Hours,
    CreatedAt,
    UpdatedAt,
    TotalViews,
    TotalDirections,
    TotalCalls,
    TotalWebsiteClicks,
}
