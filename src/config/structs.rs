use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumMessage};
use ts_rs::TS;

/// Cookie SameSite 策略
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Default,
    TS,
    EnumIter,
    AsRefStr,
    EnumMessage,
)]
#[ts(export, export_to = "../admin-panel/src/services/types.generated.ts")]
#[serde(rename_all = "PascalCase")]
#[strum(serialize_all = "PascalCase")]
pub enum SameSitePolicy {
    #[default]
    #[strum(message = "Most secure, only same-site requests carry cookies")]
    Strict,
    #[strum(message = "Allows top-level navigation to carry cookies")]
    Lax,
    #[strum(message = "No restrictions, requires Secure attribute")]
    None,
}

impl std::fmt::Display for SameSitePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strict => write!(f, "Strict"),
            Self::Lax => write!(f, "Lax"),
            Self::None => write!(f, "None"),
        }
    }
}

impl std::str::FromStr for SameSitePolicy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lax" => Ok(Self::Lax),
            "none" => Ok(Self::None),
            _ => Err(format!(
                "Invalid SameSite policy: '{}'. Valid: Strict, Lax, None",
                s
            )),
        }
    }
}

/// 静态配置（从 TOML + 环境变量加载，启动时使用）
///
/// - server: 服务器地址、端口、worker 数量
/// - database: 数据库连接配置
/// - logging: 日志配置
/// - api: 管理端认证 / Cookie / CORS 配置
/// - analytics: 聚合查询配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub analytics: AnalyticsSettings,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：HM，分隔符：__
    /// 示例：HM__SERVER__PORT=9999
    pub fn load() -> Self {
        use config::{Config, Environment, File};

        let path = "config.toml";

        let builder = Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::with_name(path).required(false))
            // 2. 从环境变量覆盖，前缀 HM，分隔符 __
            .add_source(
                Environment::with_prefix("HM")
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

/// Admin API 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// 管理员用户名（共享凭据）
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
    /// 管理员密码：Argon2 哈希，或开发环境下的明文
    #[serde(default)]
    pub admin_password: String,
    /// JWT 签名密钥；为空时启动生成随机值（重启后已签发 token 失效）
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_access_token_hours")]
    pub access_token_hours: u64,
    #[serde(default)]
    pub cookie_secure: bool,
    #[serde(default)]
    pub cookie_same_site: SameSitePolicy,
    #[serde(default)]
    pub cookie_domain: Option<String>,
    #[serde(default = "default_admin_prefix")]
    pub admin_prefix: String,
    /// CORS 允许的来源；为空表示仅同源
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

/// 分析聚合配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSettings {
    /// dashboard 最近事件条数
    #[serde(default = "default_recent_events_limit")]
    pub recent_events_limit: u64,
    /// dashboard 热门餐厅条数
    #[serde(default = "default_top_restaurants_limit")]
    pub top_restaurants_limit: u64,
    /// dashboard 全量 COUNT 缓存 TTL（秒）
    #[serde(default = "default_dashboard_cache_ttl_secs")]
    pub dashboard_cache_ttl_secs: u64,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_database_url() -> String {
    "halalmap.db".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_access_token_hours() -> u64 {
    8
}

fn default_admin_prefix() -> String {
    "/admin".to_string()
}

fn default_recent_events_limit() -> u64 {
    50
}

fn default_top_restaurants_limit() -> u64 {
    10
}

fn default_dashboard_cache_ttl_secs() -> u64 {
    30
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            admin_username: default_admin_username(),
            admin_password: String::new(),
            jwt_secret: String::new(),
            access_token_hours: default_access_token_hours(),
            cookie_secure: false,
            cookie_same_site: SameSitePolicy::default(),
            cookie_domain: None,
            admin_prefix: default_admin_prefix(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            recent_events_limit: default_recent_events_limit(),
            top_restaurants_limit: default_top_restaurants_limit(),
            dashboard_cache_ttl_secs: default_dashboard_cache_ttl_secs(),
        }
    }
}
