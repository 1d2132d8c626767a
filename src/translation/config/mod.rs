//! 翻译配置管理模块
//!
//! 支持环境变量、配置文件和默认值

pub mod manager;

// 重新导出主要类型
pub use manager::{ConfigManager, TranslationConfig};

/// 配置常量
pub mod constants {
    use std::time::Duration;

    // 批次处理相关
    pub const DEFAULT_BATCH_SIZE: usize = 50;
    pub const MAX_BATCH_SIZE: usize = 200;

    // 默认接口设置
    pub const DEFAULT_ENDPOINT_URL: &str = "http://127.0.0.1:7080/api/translate";
    pub const DEFAULT_TARGET_LANG: &str = "English";
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
    pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

    // 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &[
        "htmledit.toml",
        ".htmledit.toml",
        "~/.config/htmledit/config.toml",
    ];
}
