mod structs;

use std::sync::OnceLock;

pub use structs::*;

/// 全局静态配置
static CONFIG: OnceLock<StaticConfig> = OnceLock::new();

/// 初始化配置（进程内只加载一次）
pub fn init_config() -> &'static StaticConfig {
    CONFIG.get_or_init(StaticConfig::load)
}

/// 读取全局配置；未显式初始化时按默认路径加载
pub fn get_config() -> &'static StaticConfig {
    CONFIG.get_or_init(StaticConfig::load)
}
