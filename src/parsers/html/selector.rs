use markup5ever_rcdom::Handle;

use super::dom::{
    element_children, get_node_attr, get_node_name, get_parent_element, get_parent_node, is_element,
};

/// 选择器路径最多包含的层级
pub const MAX_SELECTOR_DEPTH: usize = 6;

/// 生成元素的结构定位字符串，例如 `div#main > ul:nth-of-type(1) > li:nth-of-type(3)`
///
/// 仅用于展示。带 `id` 的祖先会提前结束回溯。
pub fn css_path(element: &Handle) -> String {
    if !is_element(element) {
        return String::new();
    }

    let mut parts: Vec<String> = Vec::new();
    let mut current = Some(element.clone());

    while let Some(node) = current {
        if parts.len() >= MAX_SELECTOR_DEPTH {
            break;
        }
        let Some(tag) = get_node_name(&node).map(str::to_ascii_lowercase) else {
            break;
        };

        match get_node_attr(&node, "id").filter(|id| !id.is_empty()) {
            Some(id) => {
                parts.push(format!("{}#{}", tag, id));
                break;
            }
            None => {
                parts.push(format!("{}:nth-of-type({})", tag, nth_of_type(&node)));
            }
        }

        current = get_parent_element(&node);
    }

    parts.reverse();
    parts.join(" > ")
}

/// 在同名兄弟元素中的序号（从 1 开始）
fn nth_of_type(element: &Handle) -> usize {
    let Some(parent) = get_parent_node(element) else {
        return 1;
    };
    let tag = get_node_name(element);

    let mut nth = 1;
    for sibling in element_children(&parent) {
        if std::rc::Rc::ptr_eq(&sibling, element) {
            break;
        }
        if get_node_name(&sibling) == tag {
            nth += 1;
        }
    }
    nth
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::{element_descendants, html_str_to_dom};

    fn path_of(html: &str, predicate: impl Fn(&Handle) -> bool) -> String {
        let dom = html_str_to_dom(html, false);
        let node = element_descendants(&dom.document)
            .into_iter()
            .filter(|n| predicate(n))
            .last()
            .unwrap();
        css_path(&node)
    }

    #[test]
    fn test_nth_of_type_counts_same_tag_only() {
        let path = path_of(
            "<html><body><ul><li>a</li><p>x</p><li>b</li></ul></body></html>",
            |n| get_node_name(n) == Some("li"),
        );
        assert_eq!(
            path,
            "html:nth-of-type(1) > body:nth-of-type(1) > ul:nth-of-type(1) > li:nth-of-type(2)"
        );
    }

    #[test]
    fn test_id_stops_walk() {
        let path = path_of(
            "<html><body><div id=\"main\"><p><span>x</span></p></div></body></html>",
            |n| get_node_name(n) == Some("span"),
        );
        assert_eq!(path, "div#main > p:nth-of-type(1) > span:nth-of-type(1)");
    }

    #[test]
    fn test_depth_is_capped() {
        let path = path_of(
            "<html><body><div><div><div><div><div><b>x</b></div></div></div></div></div></body></html>",
            |n| get_node_name(n) == Some("b"),
        );
        assert_eq!(path.split(" > ").count(), MAX_SELECTOR_DEPTH);
        assert!(path.ends_with("b:nth-of-type(1)"));
        assert!(!path.starts_with("html"));
    }
}
