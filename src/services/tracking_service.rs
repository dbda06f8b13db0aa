//! Tracking service layer
//!
//! 事件摄取与会话生命周期的业务逻辑：
//! - 访客按指纹原子 upsert（服务端不生成身份，只做 lookup-or-create）
//! - 会话惰性创建，创建竞态幂等收敛
//! - 事件落库 + 餐厅计数器 fire-and-forget 累加
//!
//! 无请求间内存状态：每次摄取都从存储重解析身份。

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::errors::Result;
use crate::storage::SeaOrmStorage;
use crate::storage::backend::{NewEvent, NewSession};
use crate::utils::device_class;
use migration::entities::restaurant;

/// 转化动作名 → 对应的餐厅计数器列
fn conversion_counter_column(event_name: &str) -> Option<restaurant::Column> {
    match event_name {
        "directions_click" => Some(restaurant::Column::TotalDirections),
        "call_click" => Some(restaurant::Column::TotalCalls),
        "website_click" => Some(restaurant::Column::TotalWebsiteClicks),
        _ => None,
    }
}

/// 一次摄取调用的输入（身份字段已在 API 层校验非空）
#[derive(Debug, Clone)]
pub struct IngestRequest {
    pub visitor_id: String,
    pub session_id: String,
    pub event_type: String,
    pub event_name: String,
    pub page: Option<String>,
    pub restaurant_id: Option<String>,
    pub metadata: Option<serde_json::Value>,
    /// 来自请求头，用于新会话的设备分类
    pub user_agent: String,
}

/// 事件摄取服务
pub struct TrackingService {
    storage: Arc<SeaOrmStorage>,
}

impl TrackingService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// 摄取单个事件
    ///
    /// 各写入独立原子，不包跨实体事务；任一身份/事件写入失败
    /// 整个调用失败，餐厅计数器除外（弱引用，静默跳过）。
    pub async fn ingest(&self, req: IngestRequest) -> Result<()> {
        let now = Utc::now();
        let is_page_view = req.event_type == "page_view";

        // 1. 访客解析：原子 upsert-by-fingerprint
        let visitor = self
            .storage
            .upsert_visitor(&req.visitor_id, is_page_view, now)
            .await?;

        // 2. 会话解析：(session id, visitor id) 命中则复用，否则创建
        let session = match self.storage.find_session(&req.session_id, visitor.id).await? {
            Some(existing) => existing,
            None => {
                let referrer = req
                    .metadata
                    .as_ref()
                    .and_then(|m| m.get("referrer"))
                    .and_then(|v| v.as_str())
                    .filter(|s| !s.is_empty())
                    .map(String::from);

                let created = self
                    .storage
                    .create_session(
                        NewSession {
                            id: req.session_id.clone(),
                            visitor_id: visitor.id,
                            user_agent: req.user_agent.clone(),
                            device: Some(device_class(&req.user_agent).to_string()),
                            referrer,
                            landing_page: req.page.clone(),
                        },
                        now,
                    )
                    .await?;
                info!(
                    "New session '{}' for visitor {} ({})",
                    created.id,
                    visitor.id,
                    created.device.as_deref().unwrap_or("unknown")
                );
                created
            }
        };

        // 3. 会话随事件演进：exit_page + page_views
        self.storage
            .touch_session(&session.id, req.page.as_deref(), is_page_view)
            .await?;

        // 4. 事件本体永远落库
        self.storage
            .insert_event(
                NewEvent {
                    visitor_id: visitor.id,
                    session_id: session.id.clone(),
                    event_type: req.event_type.clone(),
                    event_name: req.event_name.clone(),
                    page: req.page.clone(),
                    restaurant_id: req.restaurant_id.clone(),
                    metadata: req.metadata.unwrap_or_else(|| serde_json::json!({})),
                },
                now,
            )
            .await?;

        // 5. 餐厅计数器副作用：fire-and-forget
        //    Err 在此丢弃是有意的（目标餐厅可能已删除），
        //    失败不得冒泡给摄取调用方。
        if let Some(ref restaurant_id) = req.restaurant_id {
            if let Some(column) = conversion_counter_column(&req.event_name)
                && let Err(e) = self
                    .storage
                    .increment_restaurant_counter(restaurant_id, column)
                    .await
            {
                debug!(
                    "Conversion counter update for restaurant '{}' skipped: {}",
                    restaurant_id, e
                );
            }

            if is_page_view
                && let Err(e) = self
                    .storage
                    .increment_restaurant_counter(restaurant_id, restaurant::Column::TotalViews)
                    .await
            {
                debug!(
                    "View counter update for restaurant '{}' skipped: {}",
                    restaurant_id, e
                );
            }
        }

        Ok(())
    }

    /// 关闭会话（页面卸载 beacon）
    ///
    /// 返回 ()：best-effort 语义，错误在此丢弃，
    /// 调用方（unload handler）观察不到也无法重试。
    pub async fn end_session(&self, session_id: &str, duration: i64) {
        if let Err(e) = self
            .storage
            .close_session(session_id, duration, Utc::now())
            .await
        {
            debug!("Session '{}' close skipped: {}", session_id, e);
        }
    }
}
