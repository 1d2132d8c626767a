//! # htmledit
//!
//! 批量编辑和机器翻译本地 HTML 文件（以及 ZIP 归档中的 HTML 成员）的可见文本。
//!
//! ## 模块组织
//!
//! - `core` - 错误类型和扫描选项
//! - `env` - 类型安全的环境变量
//! - `parsers` - HTML 解析、可见性判断、选择器路径和序列化
//! - `editor` - 条目扫描与编辑
//! - `workspace` - 打开的文件、归档和应用状态
//! - `translation` - 批次翻译客户端
//! - `web` - 翻译代理服务（可选）

pub mod core;
pub mod editor;
pub mod env;
pub mod parsers;
pub mod translation;
#[cfg(feature = "web")]
pub mod web;
pub mod workspace;

// Re-export commonly used items for convenience
pub use core::{EditorError, EditorResult, ScanOptions};
pub use editor::{scan, Entry, EntryKind, EntrySummary};
pub use parsers::{html_to_dom, serialize_document, ParseOptions};
pub use workspace::{FileSession, Workspace};
