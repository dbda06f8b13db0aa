//! 埋点上报客户端
//!
//! fire-and-forget：所有发送失败静默丢弃。埋点数据丢失是
//! 接受的取舍，绝不阻塞或重试用户路径。

use std::sync::OnceLock;
use std::time::{Duration, Instant};

use serde_json::{Value, json};
use ureq::Agent;

use super::identity::IdentityProvider;

/// HTTP 请求超时时间
const HTTP_TIMEOUT_SECS: u64 = 2;

/// 全局 HTTP Agent（ureq 的 Agent 是 Send + Sync）
static HTTP_AGENT: OnceLock<Agent> = OnceLock::new();

fn get_agent() -> &'static Agent {
    HTTP_AGENT.get_or_init(|| {
        Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(HTTP_TIMEOUT_SECS)))
            .build()
            .into()
    })
}

/// 一个待上报事件
#[derive(Debug, Clone)]
pub struct TrackEvent {
    pub event_type: String,
    pub event_name: String,
    pub page: Option<String>,
    pub restaurant_id: Option<String>,
    pub metadata: Option<Value>,
}

impl TrackEvent {
    /// 页面浏览
    pub fn page_view(page: &str, restaurant_id: Option<&str>) -> Self {
        Self {
            event_type: "page_view".to_string(),
            event_name: "page_view".to_string(),
            page: Some(page.to_string()),
            restaurant_id: restaurant_id.map(String::from),
            metadata: None,
        }
    }

    /// 筛选器使用
    pub fn filter_use(filter_name: &str, filter_value: &Value, page: &str) -> Self {
        Self {
            event_type: "filter_use".to_string(),
            event_name: filter_name.to_string(),
            page: Some(page.to_string()),
            restaurant_id: None,
            metadata: Some(json!({
                "filterName": filter_name,
                "filterValue": filter_value,
            })),
        }
    }

    /// 餐厅卡片点击
    pub fn restaurant_view(restaurant_id: &str, restaurant_name: &str) -> Self {
        Self {
            event_type: "restaurant_view".to_string(),
            event_name: "restaurant_card_click".to_string(),
            page: None,
            restaurant_id: Some(restaurant_id.to_string()),
            metadata: Some(json!({ "restaurantName": restaurant_name })),
        }
    }

    /// 转化动作（directions_click / call_click / website_click）
    pub fn conversion(action: &str, restaurant_id: &str, restaurant_name: &str, page: &str) -> Self {
        Self {
            event_type: "conversion".to_string(),
            event_name: action.to_string(),
            page: Some(page.to_string()),
            restaurant_id: Some(restaurant_id.to_string()),
            metadata: Some(json!({
                "restaurantName": restaurant_name,
                "action": action,
            })),
        }
    }
}

/// 埋点客户端
pub struct Tracker {
    base_url: String,
    visitor_id: String,
    session_id: String,
    referrer: Option<String>,
    started: Instant,
}

impl Tracker {
    pub fn new(base_url: &str, identity: &impl IdentityProvider) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            visitor_id: identity.visitor_id().to_string(),
            session_id: identity.session_id().to_string(),
            referrer: None,
            started: Instant::now(),
        }
    }

    /// 设置来源页（对应浏览器的 document.referrer）
    pub fn with_referrer(mut self, referrer: &str) -> Self {
        self.referrer = Some(referrer.to_string());
        self
    }

    /// 上报单个事件
    ///
    /// metadata 会补上 referrer 和客户端时间戳后发出；
    /// 发送结果被有意丢弃。
    pub fn track(&self, event: TrackEvent) {
        let mut metadata = match event.metadata {
            Some(Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };
        metadata.insert(
            "referrer".to_string(),
            json!(self.referrer.clone().unwrap_or_default()),
        );
        metadata.insert(
            "timestamp".to_string(),
            json!(chrono::Utc::now().timestamp_millis()),
        );

        let payload = json!({
            "visitorId": self.visitor_id,
            "sessionId": self.session_id,
            "eventType": event.event_type,
            "eventName": event.event_name,
            "page": event.page,
            "restaurantId": event.restaurant_id,
            "metadata": Value::Object(metadata),
        });

        let url = format!("{}/api/analytics/track", self.base_url);
        let _ = get_agent().post(&url).send_json(&payload);
    }

    /// 会话结束 beacon（上报本实例存活时长）
    pub fn end_session(&self) {
        let duration = self.started.elapsed().as_secs();
        let payload = json!({
            "sessionId": self.session_id,
            "duration": duration,
        });

        let url = format!("{}/api/analytics/end-session", self.base_url);
        let _ = get_agent().post(&url).send_json(&payload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_event_constructors() {
        let pv = TrackEvent::page_view("/", None);
        assert_eq!(pv.event_type, "page_view");
        assert_eq!(pv.event_name, "page_view");

        let conv = TrackEvent::conversion("call_click", "r1", "Kebab House", "/restaurant/r1");
        assert_eq!(conv.event_type, "conversion");
        assert_eq!(conv.event_name, "call_click");
        assert_eq!(conv.restaurant_id.as_deref(), Some("r1"));

        let filter = TrackEvent::filter_use("cuisine", &json!("turkish"), "/");
        assert_eq!(filter.event_type, "filter_use");
        assert_eq!(filter.event_name, "cuisine");
    }

    #[test]
    fn test_tracker_send_failure_is_silent() {
        // 指向不可达端口：发送失败必须静默
        struct FixedIdentity;
        impl IdentityProvider for FixedIdentity {
            fn visitor_id(&self) -> &str {
                "v_test"
            }
            fn session_id(&self) -> &str {
                "s_test"
            }
        }

        let tracker = Tracker::new("http://127.0.0.1:1", &FixedIdentity);
        tracker.track(TrackEvent::page_view("/", None));
        tracker.end_session();
        // 没有 panic、没有 Result 需要处理即为通过
    }
}
