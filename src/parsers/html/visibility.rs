//! 可见性判断
//!
//! 只看内联 `style` 和 `hidden` 属性，不计算样式表，也不处理继承来的样式。

use markup5ever_rcdom::Handle;

use super::dom::{get_node_attr, get_parent_element, has_node_attr, is_element};

/// 元素自身是否被内联样式或 `hidden` 属性隐藏
pub fn is_hidden_by_inline(element: &Handle) -> bool {
    if has_node_attr(element, "hidden") {
        return true;
    }

    match get_node_attr(element, "style") {
        Some(style) => {
            let style = style.to_lowercase();
            style.contains("display:none") || style.contains("visibility:hidden")
        }
        None => false,
    }
}

/// 元素及其所有祖先都未被隐藏
pub fn is_effectively_visible(element: &Handle) -> bool {
    let mut current = Some(element.clone());
    while let Some(node) = current {
        if is_element(&node) && is_hidden_by_inline(&node) {
            return false;
        }
        current = get_parent_element(&node);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use markup5ever_rcdom::RcDom;
    use crate::parsers::html::dom::{element_descendants, get_node_name, html_str_to_dom};

    fn element(html: &str, tag: &str) -> (RcDom, Handle) {
        let dom = html_str_to_dom(html, false);
        let found = element_descendants(&dom.document)
            .into_iter()
            .find(|node| get_node_name(node) == Some(tag))
            .unwrap();
        (dom, found)
    }

    #[test]
    fn test_visible_by_default() {
        let (_dom, span) = element("<div><p><span>x</span></p></div>", "span");
        assert!(is_effectively_visible(&span));
    }

    #[test]
    fn test_hidden_attribute() {
        let (_dom, span) = element("<div hidden><span>x</span></div>", "span");
        assert!(!is_effectively_visible(&span));
    }

    #[test]
    fn test_inline_style_case_insensitive() {
        let (_dom, span) = element("<div style=\"DISPLAY:NONE\"><span>x</span></div>", "span");
        assert!(!is_effectively_visible(&span));

        let (_dom, span) = element("<p style=\"color:red; visibility:hidden\"><span>x</span></p>", "span");
        assert!(!is_effectively_visible(&span));
    }

    #[test]
    fn test_spaced_declaration_is_not_matched() {
        // 子串匹配，不解析 CSS
        let (_dom, span) = element("<div style=\"display: none\"><span>x</span></div>", "span");
        assert!(is_effectively_visible(&span));
    }
}
