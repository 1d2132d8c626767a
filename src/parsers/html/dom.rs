use std::sync::OnceLock;

use encoding_rs::{Encoding, UTF_8};
use html5ever::interface::{Attribute, QualName};
use html5ever::parse_document;
use html5ever::tendril::{format_tendril, StrTendril, TendrilSink};
use html5ever::{namespace_url, ns, LocalName};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use regex::Regex;

/// 文档加载选项
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// 加载时清理 BOM、开头空行和字面量 `\n`
    pub sanitize: bool,
    /// 字符集标签（如 `windows-1252`），为空时按 UTF-8 解码
    pub encoding: Option<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            sanitize: true,
            encoding: None,
        }
    }
}

/// 将 HTML 字节转换为 DOM
pub fn html_to_dom(data: &[u8], options: &ParseOptions) -> RcDom {
    let encoding = options
        .encoding
        .as_deref()
        .and_then(|label| Encoding::for_label(label.trim().as_bytes()))
        .unwrap_or(UTF_8);

    // decode 会识别并去掉 BOM
    let (decoded, _, had_errors) = encoding.decode(data);
    if had_errors {
        tracing::warn!("文档包含无法按 {} 解码的字节", encoding.name());
    }

    html_str_to_dom(&decoded, options.sanitize)
}

/// 将 HTML 字符串转换为 DOM
pub fn html_str_to_dom(source: &str, sanitize: bool) -> RcDom {
    let dom = if sanitize {
        let cleaned = sanitize_source(source);
        parse_document(RcDom::default(), Default::default()).one(cleaned.as_str())
    } else {
        parse_document(RcDom::default(), Default::default()).one(source)
    };

    if sanitize {
        strip_literal_newlines(&dom);
    }

    dom
}

fn cached_regex(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

fn leading_escapes_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(&RE, r"^(?:\s*\\n)+")
}

fn leading_blank_lines_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(&RE, r"^\s*\n+")
}

fn escape_only_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(&RE, r"^(?:\s*\\n)+\s*$")
}

fn literal_newlines_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(&RE, r"(?:\\n)+")
}

/// 去掉源文本开头的 BOM、字面量 `\n` 和空行
pub fn sanitize_source(source: &str) -> String {
    let mut s = source.strip_prefix('\u{feff}').unwrap_or(source).to_string();

    if let Some(re) = leading_escapes_re() {
        s = re.replace(&s, "").into_owned();
    }
    if let Some(re) = leading_blank_lines_re() {
        s = re.replace(&s, "").into_owned();
    }

    s
}

/// 删除 body 开头只含字面量 `\n` 的文本节点，并去掉正文文本中的字面量 `\n`
pub fn strip_literal_newlines(dom: &RcDom) {
    let Some(body) = find_body(&dom.document) else {
        return;
    };

    if let Some(escape_only) = escape_only_re() {
        loop {
            let first = body.children.borrow().first().cloned();
            match first {
                Some(node) if text_matches(&node, escape_only) => {
                    body.children.borrow_mut().remove(0);
                    node.parent.set(None);
                }
                _ => break,
            }
        }
    }

    let Some(literal) = literal_newlines_re() else {
        return;
    };
    for node in text_descendants(&body) {
        if let NodeData::Text { contents } = &node.data {
            let current = contents.borrow().to_string();
            let cleaned = literal.replace_all(&current, "");
            if cleaned != current {
                *contents.borrow_mut() = StrTendril::from_slice(&cleaned);
            }
        }
    }
}

fn text_matches(node: &Handle, re: &Regex) -> bool {
    match &node.data {
        NodeData::Text { contents } => re.is_match(&contents.borrow()),
        _ => false,
    }
}

/// 根据名称获取子节点
pub fn get_child_node_by_name(parent: &Handle, node_name: &str) -> Option<Handle> {
    let children = parent.children.borrow();
    let matching_children = children.iter().find(|child| match child.data {
        NodeData::Element { ref name, .. } => &*name.local == node_name,
        _ => false,
    });
    matching_children.cloned()
}

/// 文档根元素（通常是 `<html>`）
pub fn document_element(dom: &RcDom) -> Option<Handle> {
    dom.document
        .children
        .borrow()
        .iter()
        .find(|child| is_element(child))
        .cloned()
}

/// 查找 `<body>`
pub fn find_body(document: &Handle) -> Option<Handle> {
    let html = get_child_node_by_name(document, "html")?;
    get_child_node_by_name(&html, "body")
}

/// 获取节点属性值
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => {
            for attr in attrs.borrow().iter() {
                if &*attr.name.local == attr_name {
                    return Some(attr.value.to_string());
                }
            }
            None
        }
        _ => None,
    }
}

/// 检查节点是否带有某个属性（不关心取值）
pub fn has_node_attr(node: &Handle, attr_name: &str) -> bool {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .any(|attr| &*attr.name.local == attr_name),
        _ => false,
    }
}

/// 获取节点名称
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

pub fn is_element(node: &Handle) -> bool {
    matches!(node.data, NodeData::Element { .. })
}

/// 获取父节点，保持节点自身的父链接不变
pub fn get_parent_node(child: &Handle) -> Option<Handle> {
    let weak = child.parent.take();
    let parent = weak.as_ref().and_then(|node| node.upgrade());
    child.parent.set(weak);
    parent
}

/// 最近的元素父节点；父节点是文档本身或已分离时返回 `None`
pub fn get_parent_element(child: &Handle) -> Option<Handle> {
    get_parent_node(child).filter(is_element)
}

/// 元素子节点
pub fn element_children(node: &Handle) -> Vec<Handle> {
    node.children
        .borrow()
        .iter()
        .filter(|child| is_element(child))
        .cloned()
        .collect()
}

/// 按文档顺序收集所有文本节点
pub fn text_descendants(node: &Handle) -> Vec<Handle> {
    let mut found = Vec::new();
    collect_nodes(node, &mut found, &|n: &Handle| matches!(n.data, NodeData::Text { .. }));
    found
}

/// 按文档顺序收集所有元素（含自身）
pub fn element_descendants(node: &Handle) -> Vec<Handle> {
    let mut found = Vec::new();
    if is_element(node) {
        found.push(node.clone());
    }
    collect_nodes(node, &mut found, &is_element);
    found
}

/// 先序遍历 `node` 的后代，使用显式栈，嵌套深度不受调用栈限制
fn collect_nodes(node: &Handle, found: &mut Vec<Handle>, keep: &dyn Fn(&Handle) -> bool) {
    let mut stack: Vec<Handle> = node.children.borrow().iter().rev().cloned().collect();
    while let Some(current) = stack.pop() {
        if keep(&current) {
            found.push(current.clone());
        }
        stack.extend(current.children.borrow().iter().rev().cloned());
    }
}

/// 读取文本节点当前内容
pub fn get_text(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Text { contents } => Some(contents.borrow().to_string()),
        _ => None,
    }
}

/// 覆盖文本节点内容；非文本节点返回 `false`
pub fn set_text(node: &Handle, value: &str) -> bool {
    match &node.data {
        NodeData::Text { contents } => {
            *contents.borrow_mut() = StrTendril::from_slice(value);
            true
        }
        _ => false,
    }
}

/// 设置节点属性
pub fn set_node_attr(node: &Handle, attr_name: &str, attr_value: Option<&str>) {
    if let NodeData::Element { attrs, .. } = &node.data {
        let attrs_mut = &mut attrs.borrow_mut();
        let mut i = 0;
        let mut found_existing_attr: bool = false;

        while i < attrs_mut.len() {
            if &attrs_mut[i].name.local == attr_name {
                found_existing_attr = true;

                if let Some(attr_value) = attr_value {
                    attrs_mut[i].value.clear();
                    attrs_mut[i].value.push_slice(attr_value);
                } else {
                    // Remove attr completely if attr_value is not defined
                    attrs_mut.remove(i);
                    continue;
                }
            }

            i += 1;
        }

        if !found_existing_attr {
            if let Some(attr_value) = attr_value {
                let name = LocalName::from(attr_name);

                attrs_mut.push(Attribute {
                    name: QualName::new(None, ns!(), name),
                    value: format_tendril!("{}", attr_value),
                });
            }
        }
    };
}
