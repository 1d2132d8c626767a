/// 文本永远不会进入扫描结果的元素
pub const SKIP_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// 片段最短长度（字符数，规范化之后）
pub const MIN_SNIPPET_CHARS: usize = 3;

/// 可翻译属性，按扫描时的优先顺序排列
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TranslatableAttr {
    Title,
    Alt,
    AriaLabel,
}

impl TranslatableAttr {
    pub const ALL: [TranslatableAttr; 3] = [
        TranslatableAttr::Title,
        TranslatableAttr::Alt,
        TranslatableAttr::AriaLabel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TranslatableAttr::Title => "title",
            TranslatableAttr::Alt => "alt",
            TranslatableAttr::AriaLabel => "aria-label",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|attr| attr.as_str() == name)
    }
}

/// 折叠连续空白为单个空格并去掉首尾空白
pub fn normalize_whitespace(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for word in raw.split(|c: char| c.is_whitespace()).filter(|w| !w.is_empty()) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// 检查元素是否在排除列表中
pub fn is_skipped_element(tag: &str) -> bool {
    SKIP_ELEMENTS.contains(&tag.to_ascii_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  Hello \n\t world  "), "Hello world");
        assert_eq!(normalize_whitespace("\n\n"), "");
        assert_eq!(normalize_whitespace("a\u{a0}b"), "a b");
    }

    #[test]
    fn test_attr_order() {
        let names: Vec<&str> = TranslatableAttr::ALL.iter().map(|a| a.as_str()).collect();
        assert_eq!(names, vec!["title", "alt", "aria-label"]);
        assert_eq!(TranslatableAttr::from_name("alt"), Some(TranslatableAttr::Alt));
        assert_eq!(TranslatableAttr::from_name("placeholder"), None);
    }

    #[test]
    fn test_skipped_elements() {
        assert!(is_skipped_element("SCRIPT"));
        assert!(is_skipped_element("head"));
        assert!(!is_skipped_element("p"));
    }
}
