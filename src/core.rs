use std::io;

use thiserror::Error;

use crate::translation::error::TranslationError;

/// Represents errors that can occur while editing or translating documents
///
/// Input errors never touch the document. Transport and contract errors
/// arrive wrapped in [`EditorError::Translation`] and leave whatever was
/// already applied in place.
#[derive(Error, Debug)]
pub enum EditorError {
    /// 调用方输入无效（空的查找词、空的目标语言等）
    #[error("输入无效: {0}")]
    InvalidInput(String),

    /// 没有可操作的活动文件
    #[error("没有活动文件")]
    NoActiveSession,

    /// 本次扫描中不存在该条目
    #[error("条目 #{0} 不存在")]
    UnknownEntry(usize),

    /// 条目引用的节点已不在文档中
    #[error("条目 #{0} 已失效，请重新扫描")]
    StaleEntry(usize),

    /// 会话正在翻译，拒绝并发操作
    #[error("文件 {0} 正在翻译中")]
    SessionBusy(String),

    /// 文件读写错误
    #[error("IO错误: {0}")]
    Io(#[from] io::Error),

    /// ZIP 归档错误
    #[error("ZIP错误: {0}")]
    Archive(String),

    /// 翻译错误
    #[error(transparent)]
    Translation(#[from] TranslationError),
}

impl EditorError {
    pub fn invalid_input<T: std::fmt::Display>(msg: T) -> Self {
        EditorError::InvalidInput(msg.to_string())
    }
}

impl From<zip::result::ZipError> for EditorError {
    fn from(error: zip::result::ZipError) -> Self {
        EditorError::Archive(error.to_string())
    }
}

pub type EditorResult<T> = Result<T, EditorError>;

/// Options that control which text a scan picks up
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanOptions {
    /// Also collect `title`, `alt` and `aria-label` attribute values
    pub include_attributes: bool,
    /// Skip snippets shorter than [`crate::parsers::html::MIN_SNIPPET_CHARS`]
    pub hide_short: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            include_attributes: false,
            hide_short: true,
        }
    }
}

/// Sanitizes a file name so it can be stored as a flat archive member
pub fn flatten_member_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return "file.html".to_string();
    }
    trimmed.replace(['/', '\\'], "_")
}

/// Ensures the given archive name ends with `.zip`
pub fn ensure_zip_extension(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        return crate::workspace::DEFAULT_EXPORT_NAME.to_string();
    }
    if name.to_lowercase().ends_with(".zip") {
        name.to_string()
    } else {
        format!("{name}.zip")
    }
}
