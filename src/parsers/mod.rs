//! # 解析器模块
//!
//! 目前只有 HTML：文档加载与清理、DOM 辅助函数、可见性判断、定位字符串和序列化。

pub mod html;

pub use html::{html_to_dom, serialize_document, ParseOptions};
