//! 身份解析器
//!
//! 访客指纹由固定的设备信号组合派生（xxh64 短哈希），
//! 持久化在 durable store 中，同一设备档案跨会话稳定。
//! 会话 token 随机生成，只活在一个 provider 实例的生命周期里。
//!
//! 指纹是近似身份：可碰撞、可伪造，只保证同档案稳定，
//! 不保证一人一值。

use std::fs;
use std::io;
use std::path::Path;

use xxhash_rust::xxh64::xxh64;

/// 身份提供者抽象（注入埋点客户端）
pub trait IdentityProvider {
    /// 访客指纹（跨会话稳定）
    fn visitor_id(&self) -> &str;
    /// 会话 token（随浏览上下文销毁）
    fn session_id(&self) -> &str;
}

/// 参与指纹计算的设备信号
#[derive(Debug, Clone)]
pub struct DeviceSignals {
    pub user_agent: String,
    pub language: String,
    pub screen_width: u32,
    pub screen_height: u32,
    pub color_depth: u8,
    pub timezone_offset_minutes: i32,
    pub hardware_concurrency: u32,
    /// canvas 渲染熵源（任意 blob，客户端自行采集）
    pub canvas_entropy: String,
}

impl DeviceSignals {
    /// 信号拼接为哈希输入（字段顺序固定，改动会使所有指纹漂移）
    fn material(&self) -> String {
        format!(
            "{}|{}|{}x{}|{}|{}|{}|{}",
            self.user_agent,
            self.language,
            self.screen_width,
            self.screen_height,
            self.color_depth,
            self.timezone_offset_minutes,
            self.hardware_concurrency,
            self.canvas_entropy,
        )
    }
}

/// 由设备信号确定性地派生指纹
pub fn fingerprint(signals: &DeviceSignals) -> String {
    format!("v_{}", to_base36(xxh64(signals.material().as_bytes(), 0)))
}

/// 生成会话 token：毫秒时间戳 + 随机数，base36 编码
pub fn new_session_token() -> String {
    let millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
    let nonce: u64 = rand::random();
    format!("s_{}{}", to_base36(millis), to_base36(nonce))
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).expect("base36 digits are ascii")
}

/// 指纹身份提供者
///
/// `resolve` 优先读取 store 中已持久化的访客 id（对应浏览器的
/// durable storage），没有才重新计算并写回。
#[derive(Debug, Clone)]
pub struct FingerprintIdentity {
    visitor_id: String,
    session_id: String,
}

impl FingerprintIdentity {
    /// 解析身份：持久化 store 命中则复用，否则派生并写入
    pub fn resolve(signals: &DeviceSignals, store_dir: &Path) -> io::Result<Self> {
        let id_file = store_dir.join("visitor_id");

        let visitor_id = match fs::read_to_string(&id_file) {
            Ok(existing) if !existing.trim().is_empty() => existing.trim().to_string(),
            _ => {
                let id = fingerprint(signals);
                fs::create_dir_all(store_dir)?;
                fs::write(&id_file, &id)?;
                id
            }
        };

        Ok(Self {
            visitor_id,
            session_id: new_session_token(),
        })
    }

    /// 无持久化的身份（隐私模式）：每次都重新派生
    pub fn ephemeral(signals: &DeviceSignals) -> Self {
        Self {
            visitor_id: fingerprint(signals),
            session_id: new_session_token(),
        }
    }
}

impl IdentityProvider for FingerprintIdentity {
    fn visitor_id(&self) -> &str {
        &self.visitor_id
    }

    fn session_id(&self) -> &str {
        &self.session_id
    }
}
