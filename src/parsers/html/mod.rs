//! HTML解析和处理模块
//!
//! - `utils`: 基础常量和空白规范化
//! - `dom`: 文档加载、加载清理和基础DOM操作
//! - `visibility`: 基于内联样式的可见性判断
//! - `selector`: 结构定位字符串
//! - `serializer`: 序列化功能

pub mod dom;
pub mod selector;
pub mod serializer;
pub mod utils;
pub mod visibility;

pub use dom::{
    document_element, find_body, get_node_attr, get_node_name, get_parent_element, html_str_to_dom,
    html_to_dom, set_node_attr, ParseOptions,
};
pub use selector::css_path;
pub use serializer::serialize_document;
pub use utils::{normalize_whitespace, TranslatableAttr, MIN_SNIPPET_CHARS, SKIP_ELEMENTS};
pub use visibility::{is_effectively_visible, is_hidden_by_inline};
