//! 文本收集器模块
//!
//! 遍历文档，按可见性、排除标签和最短长度规则收集可编辑条目

use markup5ever_rcdom::{Handle, RcDom};

use super::entry::{Entry, EntryKind};
use crate::core::ScanOptions;
use crate::parsers::html::dom::{
    element_descendants, find_body, get_node_attr, get_node_name, get_parent_element, get_text,
    text_descendants,
};
use crate::parsers::html::utils::is_skipped_element;
use crate::parsers::html::{
    css_path, is_effectively_visible, normalize_whitespace, TranslatableAttr, MIN_SNIPPET_CHARS,
};

/// 扫描统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub text_nodes_visited: usize,
    pub texts_collected: usize,
    pub attributes_collected: usize,
    pub skipped_empty: usize,
    pub skipped_excluded: usize,
    pub skipped_hidden: usize,
    pub skipped_short: usize,
}

impl ScanStats {
    pub fn reset(&mut self) {
        *self = Default::default();
    }
}

/// 文档文本索引器
pub struct TextIndexer {
    options: ScanOptions,
    stats: ScanStats,
    next_id: usize,
}

impl TextIndexer {
    pub fn new(options: ScanOptions) -> Self {
        Self {
            options,
            stats: ScanStats::default(),
            next_id: 1,
        }
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    /// 扫描文档：先收集正文文本，再按元素顺序收集属性
    pub fn scan(&mut self, dom: &RcDom) -> Vec<Entry> {
        self.stats.reset();
        self.next_id = 1;

        let Some(body) = find_body(&dom.document) else {
            tracing::debug!("文档没有 body，扫描结果为空");
            return Vec::new();
        };

        let mut entries = Vec::new();
        self.collect_texts(&body, &mut entries);
        if self.options.include_attributes {
            self.collect_attributes(&dom.document, &mut entries);
        }

        tracing::debug!(
            "扫描完成: {} 个文本, {} 个属性 (隐藏 {}, 过短 {}, 排除 {})",
            self.stats.texts_collected,
            self.stats.attributes_collected,
            self.stats.skipped_hidden,
            self.stats.skipped_short,
            self.stats.skipped_excluded
        );

        entries
    }

    fn collect_texts(&mut self, body: &Handle, entries: &mut Vec<Entry>) {
        for node in text_descendants(body) {
            self.stats.text_nodes_visited += 1;

            let snippet = normalize_whitespace(&get_text(&node).unwrap_or_default());
            if snippet.is_empty() {
                self.stats.skipped_empty += 1;
                continue;
            }

            let Some(parent) = get_parent_element(&node) else {
                continue;
            };
            if get_node_name(&parent).map_or(true, is_skipped_element) {
                self.stats.skipped_excluded += 1;
                continue;
            }
            if !is_effectively_visible(&parent) {
                self.stats.skipped_hidden += 1;
                continue;
            }
            if self.is_too_short(&snippet) {
                self.stats.skipped_short += 1;
                continue;
            }

            let id = self.next_id();
            entries.push(Entry::new(id, EntryKind::Text, snippet, css_path(&parent), &node));
            self.stats.texts_collected += 1;
        }
    }

    fn collect_attributes(&mut self, document: &Handle, entries: &mut Vec<Entry>) {
        for element in element_descendants(document) {
            for attr in TranslatableAttr::ALL {
                let Some(raw) = get_node_attr(&element, attr.as_str()) else {
                    continue;
                };
                let value = normalize_whitespace(&raw);
                if value.is_empty() {
                    self.stats.skipped_empty += 1;
                    continue;
                }
                if !is_effectively_visible(&element) {
                    self.stats.skipped_hidden += 1;
                    continue;
                }
                if self.is_too_short(&value) {
                    self.stats.skipped_short += 1;
                    continue;
                }

                let id = self.next_id();
                entries.push(Entry::new(
                    id,
                    EntryKind::Attribute(attr),
                    value,
                    css_path(&element),
                    &element,
                ));
                self.stats.attributes_collected += 1;
            }
        }
    }

    /// 长度按 UTF-16 码元计算，基本平面以外的字符（如 emoji）算 2
    fn is_too_short(&self, snippet: &str) -> bool {
        self.options.hide_short && snippet.encode_utf16().count() < MIN_SNIPPET_CHARS
    }

    fn next_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// 使用给定选项扫描文档
pub fn scan(dom: &RcDom, options: &ScanOptions) -> Vec<Entry> {
    TextIndexer::new(*options).scan(dom)
}
