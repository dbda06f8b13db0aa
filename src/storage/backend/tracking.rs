//! 事件摄取相关的写路径
//!
//! 所有计数器更新都表达为存储层原子表达式（col = col + n），
//! 访客 upsert 以 fingerprint 唯一约束为键，一条语句完成
//! insert-or-update，避免 check-then-act 竞态窗口。

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ActiveValue::Set, ColumnTrait, EntityTrait, ExprTrait, QueryFilter, SqlErr};
use tracing::debug;

use super::SeaOrmStorage;
use super::retry;
use crate::errors::{HalalmapError, Result};
use migration::entities::{analytics_event, restaurant, session, visitor};

/// 新会话的创建参数
#[derive(Debug, Clone)]
pub struct NewSession {
    pub id: String,
    pub visitor_id: i64,
    pub user_agent: String,
    pub device: Option<String>,
    pub referrer: Option<String>,
    pub landing_page: Option<String>,
}

/// 新事件的插入参数
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub visitor_id: i64,
    pub session_id: String,
    pub event_type: String,
    pub event_name: String,
    pub page: Option<String>,
    pub restaurant_id: Option<String>,
    pub metadata: serde_json::Value,
}

impl SeaOrmStorage {
    /// 按指纹原子 upsert 访客，返回落库后的行
    ///
    /// 未见过的指纹：插入 total_sessions=0（会话行创建时再 +1），
    /// total_page_views 按事件类型初始化。已存在：bump last_seen，
    /// 条件累加 total_page_views。同指纹并发请求由唯一约束收敛到一行。
    pub async fn upsert_visitor(
        &self,
        fingerprint: &str,
        is_page_view: bool,
        now: DateTime<Utc>,
    ) -> Result<visitor::Model> {
        let page_view_inc: i64 = if is_page_view { 1 } else { 0 };

        let model = visitor::ActiveModel {
            fingerprint: Set(fingerprint.to_string()),
            first_seen: Set(now),
            last_seen: Set(now),
            total_sessions: Set(0),
            total_page_views: Set(page_view_inc),
            ..Default::default()
        };

        let db = &self.db;
        retry::with_retry("upsert_visitor", self.retry_config, || async {
            visitor::Entity::insert(model.clone())
                .on_conflict(
                    OnConflict::column(visitor::Column::Fingerprint)
                        .value(visitor::Column::LastSeen, Expr::val(now))
                        .value(
                            visitor::Column::TotalPageViews,
                            Expr::col(visitor::Column::TotalPageViews).add(page_view_inc),
                        )
                        .to_owned(),
                )
                .exec(db)
                .await
        })
        .await
        .map_err(|e| {
            HalalmapError::database_operation(format!(
                "Upsert visitor '{}' failed: {}",
                fingerprint, e
            ))
        })?;

        // upsert 不回传行，按唯一键回读
        visitor::Entity::find()
            .filter(visitor::Column::Fingerprint.eq(fingerprint))
            .one(db)
            .await?
            .ok_or_else(|| {
                HalalmapError::database_operation(format!(
                    "Visitor '{}' missing after upsert",
                    fingerprint
                ))
            })
    }

    /// 按 (session id, visitor id) 查找会话
    pub async fn find_session(
        &self,
        session_id: &str,
        visitor_id: i64,
    ) -> Result<Option<session::Model>> {
        session::Entity::find()
            .filter(session::Column::Id.eq(session_id))
            .filter(session::Column::VisitorId.eq(visitor_id))
            .one(&self.db)
            .await
            .map_err(Into::into)
    }

    /// 创建会话；并发竞态下输家回落到已胜出的行
    ///
    /// 会话创建是幂等的：同一 id 的两个并发请求最多一个插入成功，
    /// 另一个捕获唯一约束冲突后按主键回读。只有真正插入成功的
    /// 调用会把父访客的 total_sessions +1。
    pub async fn create_session(
        &self,
        new: NewSession,
        now: DateTime<Utc>,
    ) -> Result<session::Model> {
        let model = session::ActiveModel {
            id: Set(new.id.clone()),
            visitor_id: Set(new.visitor_id),
            started_at: Set(now),
            user_agent: Set(new.user_agent),
            device: Set(new.device),
            referrer: Set(new.referrer),
            landing_page: Set(new.landing_page),
            page_views: Set(0),
            ..Default::default()
        };

        match session::Entity::insert(model).exec(&self.db).await {
            Ok(_) => {
                self.increment_visitor_sessions(new.visitor_id).await?;
            }
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                debug!(
                    "Session '{}' creation lost the race, using winning row",
                    new.id
                );
            }
            Err(e) => {
                return Err(HalalmapError::database_operation(format!(
                    "Create session '{}' failed: {}",
                    new.id, e
                )));
            }
        }

        session::Entity::find_by_id(new.id.as_str())
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                HalalmapError::database_operation(format!(
                    "Session '{}' missing after create",
                    new.id
                ))
            })
    }

    /// 父访客 total_sessions 原子 +1
    async fn increment_visitor_sessions(&self, visitor_id: i64) -> Result<()> {
        visitor::Entity::update_many()
            .col_expr(
                visitor::Column::TotalSessions,
                Expr::col(visitor::Column::TotalSessions).add(1),
            )
            .filter(visitor::Column::Id.eq(visitor_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// 每个事件对会话的更新：exit_page 跟随当前页面，
    /// page_view 事件原子累加 page_views
    pub async fn touch_session(
        &self,
        session_id: &str,
        page: Option<&str>,
        is_page_view: bool,
    ) -> Result<()> {
        if page.is_none() && !is_page_view {
            return Ok(());
        }

        let mut update =
            session::Entity::update_many().filter(session::Column::Id.eq(session_id));
        if let Some(page) = page {
            update = update.col_expr(session::Column::ExitPage, Expr::value(page));
        }
        if is_page_view {
            update = update.col_expr(
                session::Column::PageViews,
                Expr::col(session::Column::PageViews).add(1),
            );
        }
        update.exec(&self.db).await?;
        Ok(())
    }

    /// 插入事件日志行（不可变，带服务端时间戳）
    pub async fn insert_event(&self, new: NewEvent, now: DateTime<Utc>) -> Result<()> {
        let model = analytics_event::ActiveModel {
            visitor_id: Set(new.visitor_id),
            session_id: Set(new.session_id),
            event_type: Set(new.event_type),
            event_name: Set(new.event_name),
            page: Set(new.page),
            restaurant_id: Set(new.restaurant_id),
            metadata: Set(new.metadata),
            timestamp: Set(now),
            ..Default::default()
        };

        let db = &self.db;
        retry::with_retry("insert_event", self.retry_config, || async {
            analytics_event::Entity::insert(model.clone()).exec(db).await
        })
        .await
        .map_err(|e| HalalmapError::database_operation(format!("Insert event failed: {}", e)))?;

        Ok(())
    }

    /// 关闭会话：写入 ended_at 和 duration
    ///
    /// 会话不存在时更新 0 行，同样返回 Ok：关闭调用来自
    /// 页面卸载 beacon，调用方无法观察或重试失败。
    pub async fn close_session(
        &self,
        session_id: &str,
        duration: i64,
        now: DateTime<Utc>,
    ) -> Result<()> {
        session::Entity::update_many()
            .col_expr(session::Column::EndedAt, Expr::value(now))
            .col_expr(session::Column::Duration, Expr::value(duration))
            .filter(session::Column::Id.eq(session_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// 餐厅计数器原子 +1
    ///
    /// 目标不存在时更新 0 行且不报错；弱引用语义由调用方
    /// 丢弃 Err 完成闭环。
    pub async fn increment_restaurant_counter(
        &self,
        restaurant_id: &str,
        column: restaurant::Column,
    ) -> Result<()> {
        restaurant::Entity::update_many()
            .col_expr(column, Expr::col(column).add(1))
            .filter(restaurant::Column::Id.eq(restaurant_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
