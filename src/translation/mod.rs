//! 翻译模块
//!
//! 只把条目片段发送给翻译接口，从不发送序列化后的 HTML：
//! - **batch**: 按批次翻译会话并写回条目
//! - **client**: `{ texts, targetLang }` 接口客户端
//! - **protocol**: 客户端与代理共用的请求/响应结构
//! - **reply**: 模型回复解析（严格 JSON 与括号配对回退）
//! - **config**: 配置管理
//! - **error**: 错误处理
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use htmledit::translation::{translate_session, HttpTranslator, TranslationConfig};
//! use htmledit::workspace::FileSession;
//! use htmledit::{ParseOptions, ScanOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TranslationConfig::default_with_lang("Portuguese", None);
//! let translator = HttpTranslator::from_config(&config)?;
//!
//! let html = b"<html><body><p>Hello</p></body></html>";
//! let mut session = FileSession::from_bytes("index.html", html, &ParseOptions::default(), 1);
//! translate_session(&mut session, &translator, &config.target_lang, config.batch_size, &ScanOptions::default()).await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// 子模块声明
// ============================================================================

/// 批次翻译
pub mod batch;

/// 翻译接口客户端
pub mod client;

/// 配置管理模块 - 配置文件、`.env` 和环境变量
pub mod config;

/// 错误处理模块 - 统一的错误类型和处理机制
pub mod error;

/// 接口数据结构
pub mod protocol;

/// 模型回复解析
pub mod reply;

// ============================================================================
// 公共API导出
// ============================================================================

pub use batch::{batch_ranges, translate_session, TranslationReport};
pub use client::{HttpTranslator, TextTranslator};
pub use config::{ConfigManager, TranslationConfig};
pub use error::{ErrorCategory, ErrorSeverity, TranslationError, TranslationResult};
pub use protocol::{
    ErrorBody, LegacyHtmlRequest, LegacyHtmlResponse, TranslateTextsRequest,
    TranslateTextsResponse,
};
pub use reply::{parse_translated_texts, unwrap_code_fences, ReplyError};
