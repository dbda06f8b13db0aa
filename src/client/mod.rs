//! 第一方埋点客户端
//!
//! 对应浏览器端的身份解析与事件上报：身份由客户端派生并持久化，
//! 服务端只把两个 id 当不透明字符串存取。嵌入式前端（kiosk、
//! 桌面壳）直接使用本模块；Web 前端用等价的 JS 实现。

pub mod identity;
pub mod tracker;

pub use identity::{DeviceSignals, FingerprintIdentity, IdentityProvider, new_session_token};
pub use tracker::{TrackEvent, Tracker};
