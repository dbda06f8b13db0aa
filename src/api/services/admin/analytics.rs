//! Analytics API 端点
//!
//! 提供管理端的分析读取功能：
//! - dashboard：概览计数、热门餐厅、转化/筛选统计、设备分布、最近事件
//! - charts：日/周序列、24 小时分布、设备与事件类型分布
//!
//! 认证由包裹 /admin scope 的 AdminAuth 中间件完成。

use actix_web::{HttpResponse, Result as ActixResult, web};
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;

use crate::services::{AnalyticsService, RangeSelector};

use super::helpers::{error_from_halalmap, success_response};

/// charts 查询参数
#[derive(Debug, Clone, Deserialize)]
pub struct ChartsQuery {
    /// 7d | 30d | 90d，缺省 7d
    pub range: Option<String>,
}

/// GET /admin/v1/analytics/dashboard
pub async fn get_dashboard(
    analytics: web::Data<Arc<AnalyticsService>>,
) -> ActixResult<HttpResponse> {
    // 聚合失败对本次请求是致命的：不给部分结果
    Ok(match analytics.dashboard().await {
        Ok(data) => success_response(data),
        Err(e) => {
            error!("Dashboard aggregation failed: {}", e);
            error_from_halalmap(&e)
        }
    })
}

/// GET /admin/v1/analytics/charts?range=7d|30d|90d
pub async fn get_charts(
    query: web::Query<ChartsQuery>,
    analytics: web::Data<Arc<AnalyticsService>>,
) -> ActixResult<HttpResponse> {
    let range = RangeSelector::parse(query.range.as_deref().unwrap_or("7d"));

    Ok(match analytics.charts(range).await {
        Ok(data) => success_response(data),
        Err(e) => {
            error!("Charts aggregation failed: {}", e);
            error_from_halalmap(&e)
        }
    })
}

/// Analytics 路由配置
pub fn analytics_routes() -> actix_web::Scope {
    web::scope("/analytics")
        .route("/dashboard", web::get().to(get_dashboard))
        .route("/charts", web::get().to(get_charts))
}
