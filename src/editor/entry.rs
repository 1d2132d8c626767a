use std::rc::Rc;

use markup5ever_rcdom::{Handle, WeakHandle};
use serde::Serialize;

use crate::core::{EditorError, EditorResult};
use crate::parsers::html::dom::{get_node_attr, get_text, set_node_attr, set_text};
use crate::parsers::html::{normalize_whitespace, TranslatableAttr};

/// 条目类型
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// 文本节点内容
    Text,
    /// 元素上的可翻译属性
    Attribute(TranslatableAttr),
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Text => "text",
            EntryKind::Attribute(_) => "attr",
        }
    }
}

/// 一个可编辑单元：文本节点内容或一个属性值
///
/// `target` 是对文档节点的弱引用。文本条目指向文本节点，属性条目指向所属元素。
/// 条目不会延长节点的生命周期；文档被替换后写入会返回 [`EditorError::StaleEntry`]。
#[derive(Debug, Clone)]
pub struct Entry {
    /// 本次扫描内的序号，重新扫描后失效
    pub id: usize,
    pub kind: EntryKind,
    /// 结构定位字符串，仅用于展示
    pub selector: String,
    snippet: String,
    length: usize,
    target: WeakHandle,
}

impl Entry {
    pub(crate) fn new(
        id: usize,
        kind: EntryKind,
        snippet: String,
        selector: String,
        target: &Handle,
    ) -> Self {
        let length = snippet.chars().count();
        Self {
            id,
            kind,
            selector,
            snippet,
            length,
            target: Rc::downgrade(target),
        }
    }

    /// 缓存的片段
    pub fn snippet(&self) -> &str {
        &self.snippet
    }

    /// 片段字符数
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn is_attribute(&self) -> bool {
        matches!(self.kind, EntryKind::Attribute(_))
    }

    /// 属性条目的属性名
    pub fn attr_key(&self) -> Option<&'static str> {
        match self.kind {
            EntryKind::Attribute(attr) => Some(attr.as_str()),
            EntryKind::Text => None,
        }
    }

    /// 引用节点的当前原始值；节点已释放或属性已删除时返回 `None`
    pub fn live_value(&self) -> Option<String> {
        let node = self.target.upgrade()?;
        match self.kind {
            EntryKind::Text => get_text(&node),
            EntryKind::Attribute(attr) => get_node_attr(&node, attr.as_str()),
        }
    }

    /// 缓存值与文档一致
    ///
    /// 扫描得到的片段是规范化后的值，编辑写入的是原样值，两者都算一致。
    pub fn is_synchronized(&self) -> bool {
        match self.live_value() {
            Some(live) => live == self.snippet || normalize_whitespace(&live) == self.snippet,
            None => false,
        }
    }

    /// 写入文档并同步缓存
    pub(crate) fn write(&mut self, value: &str) -> EditorResult<()> {
        let node = self.target.upgrade().ok_or(EditorError::StaleEntry(self.id))?;

        match self.kind {
            EntryKind::Text => {
                if !set_text(&node, value) {
                    return Err(EditorError::StaleEntry(self.id));
                }
            }
            EntryKind::Attribute(attr) => set_node_attr(&node, attr.as_str(), Some(value)),
        }

        self.snippet = value.to_string();
        self.length = value.chars().count();
        Ok(())
    }
}

/// 条目的可序列化视图（命令行 `--json` 输出）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntrySummary {
    pub id: usize,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<&'static str>,
    pub snippet: String,
    pub length: usize,
    pub selector: String,
}

impl From<&Entry> for EntrySummary {
    fn from(entry: &Entry) -> Self {
        Self {
            id: entry.id,
            kind: entry.kind.as_str(),
            key: entry.attr_key(),
            snippet: entry.snippet.clone(),
            length: entry.length,
            selector: entry.selector.clone(),
        }
    }
}
