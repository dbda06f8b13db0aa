//! 聚合引擎的数据库查询
//!
//! 提供 dashboard / charts 所需的统计查询，供 AnalyticsService 调用。
//! 全量 COUNT 走 TTL 缓存；分组统计和时间窗口切片每次实时查询。
//! 聚合只读，不加锁，与摄取并发执行（逐查询一致性即可）。

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DbBackend, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use super::SeaOrmStorage;
use migration::entities::{analytics_event, restaurant, session, visitor};

// ============ 查询结果类型 ============

/// 分组计数结果行（conversions / filter usage）
#[derive(Debug, FromQueryResult)]
pub struct NameCountRow {
    pub name: String,
    pub count: i64,
}

/// 设备分组结果行（device 可能为 NULL）
#[derive(Debug, FromQueryResult)]
pub struct DeviceCountRow {
    pub device: Option<String>,
    pub count: i64,
}

/// 平均会话时长结果行
#[derive(Debug, FromQueryResult)]
struct AvgDurationRow {
    avg: Option<f64>,
}

/// charts 用的会话切片（只取聚合需要的列）
#[derive(Debug, Clone, FromQueryResult)]
pub struct SessionSlice {
    pub started_at: DateTime<Utc>,
    pub duration: Option<i64>,
    pub device: Option<String>,
    pub visitor_id: i64,
}

/// charts 用的事件切片
#[derive(Debug, Clone, FromQueryResult)]
pub struct EventSlice {
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
}

// ============ SeaOrmStorage Analytics 方法 ============

impl SeaOrmStorage {
    fn db_backend(&self) -> DbBackend {
        match self.backend_name.as_str() {
            "sqlite" => DbBackend::Sqlite,
            "mysql" => DbBackend::MySql,
            _ => DbBackend::Postgres,
        }
    }

    /// 带 TTL 缓存的 COUNT（dashboard 全量计数专用）
    async fn cached_count<F>(&self, key: &str, query: F) -> anyhow::Result<u64>
    where
        F: std::future::Future<Output = Result<u64, sea_orm::DbErr>>,
    {
        if let Some(cached) = self.count_cache.get(key) {
            return Ok(cached);
        }
        let count = query.await?;
        self.count_cache.insert(key.to_string(), count);
        Ok(count)
    }

    /// 访客总数
    pub async fn count_visitors(&self) -> anyhow::Result<u64> {
        self.cached_count("count:visitors", visitor::Entity::find().count(&self.db))
            .await
    }

    /// 会话总数
    pub async fn count_sessions(&self) -> anyhow::Result<u64> {
        self.cached_count("count:sessions", session::Entity::find().count(&self.db))
            .await
    }

    /// page_view 事件总数
    pub async fn count_page_view_events(&self) -> anyhow::Result<u64> {
        self.cached_count(
            "count:page_views",
            analytics_event::Entity::find()
                .filter(analytics_event::Column::EventType.eq("page_view"))
                .count(&self.db),
        )
        .await
    }

    /// 指定时间之后开始的会话数（today / week 窗口，不缓存）
    pub async fn count_sessions_since(&self, start: DateTime<Utc>) -> anyhow::Result<u64> {
        session::Entity::find()
            .filter(session::Column::StartedAt.gte(start))
            .count(&self.db)
            .await
            .map_err(Into::into)
    }

    /// 已关闭会话的平均时长（秒）
    ///
    /// 未关闭会话（duration IS NULL）不参与平均，而不是按 0 计。
    pub async fn avg_session_duration(&self) -> anyhow::Result<f64> {
        // AVG 的返回类型各后端不同（PG 为 NUMERIC），统一 cast 成双精度
        let avg_expr = match self.db_backend() {
            DbBackend::MySql => Expr::cust("CAST(AVG(duration) AS DOUBLE)"),
            DbBackend::Sqlite => Expr::cust("AVG(CAST(duration AS REAL))"),
            _ => Expr::cust("AVG(duration)::float8"),
        };

        let row = session::Entity::find()
            .select_only()
            .column_as(avg_expr, "avg")
            .filter(session::Column::Duration.is_not_null())
            .into_model::<AvgDurationRow>()
            .one(&self.db)
            .await?;

        Ok(row.and_then(|r| r.avg).unwrap_or(0.0))
    }

    /// 按 total_views 降序的热门餐厅
    pub async fn top_restaurants_by_views(
        &self,
        limit: u64,
    ) -> anyhow::Result<Vec<restaurant::Model>> {
        restaurant::Entity::find()
            .order_by_desc(restaurant::Column::TotalViews)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    /// 转化事件按动作名分组计数（全时段）
    pub async fn conversion_counts(&self) -> anyhow::Result<Vec<NameCountRow>> {
        analytics_event::Entity::find()
            .select_only()
            .column_as(analytics_event::Column::EventName, "name")
            .column_as(analytics_event::Column::Id.count(), "count")
            .filter(analytics_event::Column::EventType.eq("conversion"))
            .group_by(analytics_event::Column::EventName)
            .order_by_desc(Expr::cust("count"))
            .into_model::<NameCountRow>()
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    /// 筛选器使用按名称分组计数（限定起始时间之后）
    pub async fn filter_usage_since(
        &self,
        start: DateTime<Utc>,
    ) -> anyhow::Result<Vec<NameCountRow>> {
        analytics_event::Entity::find()
            .select_only()
            .column_as(analytics_event::Column::EventName, "name")
            .column_as(analytics_event::Column::Id.count(), "count")
            .filter(analytics_event::Column::EventType.eq("filter_use"))
            .filter(analytics_event::Column::Timestamp.gte(start))
            .group_by(analytics_event::Column::EventName)
            .order_by_desc(Expr::cust("count"))
            .into_model::<NameCountRow>()
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    /// 会话按设备类别分组计数（全时段）
    pub async fn device_breakdown(&self) -> anyhow::Result<Vec<DeviceCountRow>> {
        session::Entity::find()
            .select_only()
            .column(session::Column::Device)
            .column_as(session::Column::Id.count(), "count")
            .group_by(session::Column::Device)
            .order_by_desc(Expr::cust("count"))
            .into_model::<DeviceCountRow>()
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    /// 最近 N 条事件（新到旧）
    pub async fn recent_events(
        &self,
        limit: u64,
    ) -> anyhow::Result<Vec<analytics_event::Model>> {
        analytics_event::Entity::find()
            .order_by_desc(analytics_event::Column::Timestamp)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    /// 批量查餐厅显示名（避免最近事件流的 N+1 查询）
    pub async fn restaurant_names(
        &self,
        ids: &[String],
    ) -> anyhow::Result<Vec<(String, String)>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = restaurant::Entity::find()
            .filter(restaurant::Column::Id.is_in(ids.iter().map(|s| s.as_str())))
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(|r| (r.id, r.name)).collect())
    }

    // ============ charts 窗口切片 ============

    /// 窗口内会话切片（charts 在服务层做分桶聚合）
    pub async fn sessions_since(&self, start: DateTime<Utc>) -> anyhow::Result<Vec<SessionSlice>> {
        session::Entity::find()
            .select_only()
            .column(session::Column::StartedAt)
            .column(session::Column::Duration)
            .column(session::Column::Device)
            .column(session::Column::VisitorId)
            .filter(session::Column::StartedAt.gte(start))
            .into_model::<SessionSlice>()
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    /// 窗口内事件切片
    pub async fn events_since(&self, start: DateTime<Utc>) -> anyhow::Result<Vec<EventSlice>> {
        analytics_event::Entity::find()
            .select_only()
            .column(analytics_event::Column::Timestamp)
            .column(analytics_event::Column::EventType)
            .filter(analytics_event::Column::Timestamp.gte(start))
            .into_model::<EventSlice>()
            .all(&self.db)
            .await
            .map_err(Into::into)
    }
}
