//! Analytics service layer
//!
//! 聚合引擎：dashboard 概览与 charts 时间序列。
//!
//! # 查询策略
//!
//! - dashboard：COUNT / GROUP BY 直接下推数据库，全量计数走 TTL 缓存
//! - charts：取窗口内的会话/事件切片，在服务层完成分桶
//!   （逐日桶预初始化，零活动日报 0 而不是缺失）
//!
//! 聚合为只读扫描，与摄取并发进行；各子查询之间不要求快照一致。

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use chrono::{Duration, NaiveDate, Timelike, Utc};
use serde::Serialize;
use tracing::{debug, info};
use ts_rs::TS;

use crate::errors::{HalalmapError, Result};
use crate::storage::SeaOrmStorage;

/// 输出目录常量
const TS_EXPORT_PATH: &str = "../admin-panel/src/services/types.generated.ts";

// ============ 响应类型 ============

/// dashboard 概览计数
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct OverviewStats {
    pub total_visitors: u64,
    pub total_sessions: u64,
    /// 今日（UTC 零点起）开始的会话数
    pub today_visitors: u64,
    /// 最近 7 天开始的会话数
    pub week_visitors: u64,
    pub total_page_views: u64,
    /// 已关闭会话的平均时长（秒，取整）；未关闭会话不计入
    pub avg_session_duration: u64,
}

/// 热门餐厅条目（带四个转化计数器）
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct TopRestaurant {
    pub id: String,
    pub name: String,
    pub total_views: i64,
    pub total_directions: i64,
    pub total_calls: i64,
    pub total_website_clicks: i64,
}

/// 分组计数（conversions / filter usage）
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct NameCount {
    pub name: String,
    pub count: u64,
}

/// 设备分桶（无设备值归入 "unknown"）
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct DeviceCount {
    pub device: String,
    pub count: u64,
}

/// 最近事件条目，带餐厅显示名
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct RecentEvent {
    pub id: i64,
    pub visitor_id: i64,
    #[serde(rename = "type")]
    #[ts(rename = "type")]
    pub event_type: String,
    pub name: String,
    pub page: Option<String>,
    pub restaurant: Option<String>,
    pub timestamp: chrono::DateTime<Utc>,
    pub metadata: serde_json::Value,
}

/// dashboard 响应
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct DashboardData {
    pub overview: OverviewStats,
    pub top_restaurants: Vec<TopRestaurant>,
    pub conversions: Vec<NameCount>,
    pub filter_usage: Vec<NameCount>,
    pub device_breakdown: Vec<DeviceCount>,
    pub recent_events: Vec<RecentEvent>,
}

/// 单日聚合桶（weekly 复用同一形状）
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct DailyBucket {
    /// YYYY-MM-DD（weekly 桶为该周首日）
    pub date: String,
    /// 去重访客数（按 fingerprint 对应的 visitor 关系，不是事件数）
    pub visitors: u64,
    pub sessions: u64,
    pub page_views: u64,
    pub conversions: u64,
    pub filter_uses: u64,
    /// 桶内已关闭会话的平均时长（秒）；没有则为 0
    pub avg_duration: u64,
}

/// 24 小时分布槽位（按 UTC 小时，跨整个查询窗口）
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct HourlyBucket {
    pub hour: u8,
    pub sessions: u64,
    pub page_views: u64,
}

/// 名称-数值对（charts 的 devices / eventTypes）
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct NameValue {
    pub name: String,
    pub value: u64,
}

/// charts 响应
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct ChartsData {
    pub daily: Vec<DailyBucket>,
    pub weekly: Vec<DailyBucket>,
    pub hourly: Vec<HourlyBucket>,
    pub devices: Vec<NameValue>,
    pub event_types: Vec<NameValue>,
}

/// 回看窗口选择器
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangeSelector {
    #[default]
    Days7,
    Days30,
    Days90,
}

impl RangeSelector {
    /// 解析查询参数；无法识别时回退 7 天
    pub fn parse(s: &str) -> Self {
        match s {
            "30d" => Self::Days30,
            "90d" => Self::Days90,
            _ => Self::Days7,
        }
    }

    pub fn days(self) -> i64 {
        match self {
            Self::Days7 => 7,
            Self::Days30 => 30,
            Self::Days90 => 90,
        }
    }
}

// ============ 内部聚合状态 ============

/// 单日聚合的中间状态；total_duration/closed_sessions 供周汇总
/// 做时长加权平均，不进响应
#[derive(Default)]
struct DayAgg {
    visitors: HashSet<i64>,
    sessions: u64,
    page_views: u64,
    conversions: u64,
    filter_uses: u64,
    total_duration: i64,
    closed_sessions: u64,
}

impl DayAgg {
    fn avg_duration(&self) -> u64 {
        if self.closed_sessions > 0 {
            (self.total_duration as f64 / self.closed_sessions as f64).round() as u64
        } else {
            0
        }
    }
}

// ============ AnalyticsService ============

/// Analytics 服务
pub struct AnalyticsService {
    storage: Arc<SeaOrmStorage>,
}

impl AnalyticsService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// dashboard 聚合
    pub async fn dashboard(&self) -> Result<DashboardData> {
        info!("Analytics: dashboard query");

        let config = crate::config::get_config();
        let now = Utc::now();
        let today_start = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .expect("midnight is always valid")
            .and_utc();
        let week_ago = today_start - Duration::days(7);

        // 概览计数并发执行
        let (
            total_visitors,
            total_sessions,
            today_visitors,
            week_visitors,
            total_page_views,
            avg_duration,
        ) = tokio::try_join!(
            self.storage.count_visitors(),
            self.storage.count_sessions(),
            self.storage.count_sessions_since(today_start),
            self.storage.count_sessions_since(week_ago),
            self.storage.count_page_view_events(),
            self.storage.avg_session_duration(),
        )
        .map_err(|e| HalalmapError::analytics_query_failed(e.to_string()))?;

        // 分组统计与最近事件并发执行
        let (top_rows, conversion_rows, filter_rows, device_rows, recent_rows) = tokio::try_join!(
            self.storage
                .top_restaurants_by_views(config.analytics.top_restaurants_limit),
            self.storage.conversion_counts(),
            self.storage.filter_usage_since(week_ago),
            self.storage.device_breakdown(),
            self.storage
                .recent_events(config.analytics.recent_events_limit),
        )
        .map_err(|e| HalalmapError::analytics_query_failed(e.to_string()))?;

        // 批量回查餐厅显示名，避免 N+1
        let mut restaurant_ids: Vec<String> = recent_rows
            .iter()
            .filter_map(|e| e.restaurant_id.clone())
            .collect();
        restaurant_ids.sort();
        restaurant_ids.dedup();
        let names: HashMap<String, String> = self
            .storage
            .restaurant_names(&restaurant_ids)
            .await
            .map_err(|e| HalalmapError::analytics_query_failed(e.to_string()))?
            .into_iter()
            .collect();

        let recent_events: Vec<RecentEvent> = recent_rows
            .into_iter()
            .map(|e| {
                let restaurant = e
                    .restaurant_id
                    .as_ref()
                    .and_then(|id| names.get(id).cloned());
                RecentEvent {
                    id: e.id,
                    visitor_id: e.visitor_id,
                    event_type: e.event_type,
                    name: e.event_name,
                    page: e.page,
                    restaurant,
                    timestamp: e.timestamp,
                    metadata: e.metadata,
                }
            })
            .collect();

        let dashboard = DashboardData {
            overview: OverviewStats {
                total_visitors,
                total_sessions,
                today_visitors,
                week_visitors,
                total_page_views,
                avg_session_duration: avg_duration.round() as u64,
            },
            top_restaurants: top_rows
                .into_iter()
                .map(|r| TopRestaurant {
                    id: r.id,
                    name: r.name,
                    total_views: r.total_views,
                    total_directions: r.total_directions,
                    total_calls: r.total_calls,
                    total_website_clicks: r.total_website_clicks,
                })
                .collect(),
            conversions: conversion_rows
                .into_iter()
                .map(|r| NameCount {
                    name: r.name,
                    count: r.count as u64,
                })
                .collect(),
            filter_usage: filter_rows
                .into_iter()
                .map(|r| NameCount {
                    name: r.name,
                    count: r.count as u64,
                })
                .collect(),
            device_breakdown: device_rows
                .into_iter()
                .map(|r| DeviceCount {
                    device: r.device.unwrap_or_else(|| "unknown".to_string()),
                    count: r.count as u64,
                })
                .collect(),
            recent_events,
        };

        debug!(
            "Analytics: dashboard returned {} top restaurants, {} recent events",
            dashboard.top_restaurants.len(),
            dashboard.recent_events.len()
        );

        Ok(dashboard)
    }

    /// charts 时间序列聚合
    ///
    /// 窗口为 D 个连续自然日（UTC），以当前日期收尾。每个会话/事件
    /// 按自身时间戳落入恰好一个日桶。
    pub async fn charts(&self, range: RangeSelector) -> Result<ChartsData> {
        let days = range.days();
        info!("Analytics: charts query, range={} days", days);

        let today = Utc::now().date_naive();
        let start_date = today - Duration::days(days - 1);
        let window_start = start_date
            .and_hms_opt(0, 0, 0)
            .expect("midnight is always valid")
            .and_utc();

        let (sessions, events) = tokio::try_join!(
            self.storage.sessions_since(window_start),
            self.storage.events_since(window_start),
        )
        .map_err(|e| HalalmapError::analytics_query_failed(e.to_string()))?;

        // 窗口内每一天预建桶，零活动日报 0 而不是缺失
        let mut day_map: BTreeMap<NaiveDate, DayAgg> = BTreeMap::new();
        for i in 0..days {
            day_map.insert(start_date + Duration::days(i), DayAgg::default());
        }

        for s in &sessions {
            let key = s.started_at.date_naive();
            if let Some(agg) = day_map.get_mut(&key) {
                agg.visitors.insert(s.visitor_id);
                agg.sessions += 1;
                if let Some(d) = s.duration {
                    agg.total_duration += d;
                    agg.closed_sessions += 1;
                }
            }
        }

        for e in &events {
            let key = e.timestamp.date_naive();
            if let Some(agg) = day_map.get_mut(&key) {
                match e.event_type.as_str() {
                    "page_view" => agg.page_views += 1,
                    "conversion" => agg.conversions += 1,
                    "filter_use" => agg.filter_uses += 1,
                    _ => {}
                }
            }
        }

        let daily: Vec<DailyBucket> = day_map
            .iter()
            .map(|(date, agg)| DailyBucket {
                date: date.format("%Y-%m-%d").to_string(),
                visitors: agg.visitors.len() as u64,
                sessions: agg.sessions,
                page_views: agg.page_views,
                conversions: agg.conversions,
                filter_uses: agg.filter_uses,
                avg_duration: agg.avg_duration(),
            })
            .collect();

        // 7 天一组滚成周桶；时长平均按周内已关闭会话加权，
        // 不是日均值的再平均
        let day_entries: Vec<(&NaiveDate, &DayAgg)> = day_map.iter().collect();
        let weekly: Vec<DailyBucket> = day_entries
            .chunks(7)
            .map(|week| {
                let total_duration: i64 = week.iter().map(|(_, a)| a.total_duration).sum();
                let closed: u64 = week.iter().map(|(_, a)| a.closed_sessions).sum();
                let avg_duration = if closed > 0 {
                    (total_duration as f64 / closed as f64).round() as u64
                } else {
                    0
                };
                DailyBucket {
                    date: week[0].0.format("%Y-%m-%d").to_string(),
                    visitors: week.iter().map(|(_, a)| a.visitors.len() as u64).sum(),
                    sessions: week.iter().map(|(_, a)| a.sessions).sum(),
                    page_views: week.iter().map(|(_, a)| a.page_views).sum(),
                    conversions: week.iter().map(|(_, a)| a.conversions).sum(),
                    filter_uses: week.iter().map(|(_, a)| a.filter_uses).sum(),
                    avg_duration,
                }
            })
            .collect();

        // 24 小时分布：独立于日期分桶，跨整个窗口
        let mut hourly: Vec<HourlyBucket> = (0..24)
            .map(|hour| HourlyBucket {
                hour,
                sessions: 0,
                page_views: 0,
            })
            .collect();
        for s in &sessions {
            hourly[s.started_at.hour() as usize].sessions += 1;
        }
        for e in &events {
            if e.event_type == "page_view" {
                hourly[e.timestamp.hour() as usize].page_views += 1;
            }
        }

        // 设备与事件类型分布（整个窗口）
        let mut device_counts: HashMap<String, u64> = HashMap::new();
        for s in &sessions {
            let device = s.device.clone().unwrap_or_else(|| "unknown".to_string());
            *device_counts.entry(device).or_insert(0) += 1;
        }
        let mut event_type_counts: HashMap<String, u64> = HashMap::new();
        for e in &events {
            *event_type_counts.entry(e.event_type.clone()).or_insert(0) += 1;
        }

        debug!(
            "Analytics: charts aggregated {} sessions, {} events into {} daily buckets",
            sessions.len(),
            events.len(),
            daily.len()
        );

        Ok(ChartsData {
            daily,
            weekly,
            hourly,
            devices: sorted_name_values(device_counts),
            event_types: sorted_name_values(event_type_counts),
        })
    }
}

/// HashMap → 按计数降序（同数按名称）的稳定列表
fn sorted_name_values(map: HashMap<String, u64>) -> Vec<NameValue> {
    let mut items: Vec<NameValue> = map
        .into_iter()
        .map(|(name, value)| NameValue { name, value })
        .collect();
    items.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.name.cmp(&b.name)));
    items
}
