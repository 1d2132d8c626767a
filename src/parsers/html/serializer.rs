use std::io;

use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};

use super::dom::document_element;

/// 序列化文档：doctype 声明加上根元素的完整标记
pub fn serialize_document(dom: &RcDom) -> io::Result<String> {
    let mut out = String::new();

    if let Some(doctype) = doctype_declaration(&dom.document) {
        out.push_str(&doctype);
    }

    if let Some(root) = document_element(dom) {
        out.push_str(&serialize_node(&root)?);
    }

    Ok(out)
}

/// 序列化单个元素（含自身标签）
pub fn serialize_node(node: &Handle) -> io::Result<String> {
    let mut buf: Vec<u8> = Vec::new();
    let serializable: SerializableHandle = node.clone().into();
    serialize(
        &mut buf,
        &serializable,
        SerializeOpts {
            traversal_scope: TraversalScope::IncludeNode,
            ..Default::default()
        },
    )?;

    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// 重建 `<!DOCTYPE ...>`，没有 doctype 时返回 `None`
pub fn doctype_declaration(document: &Handle) -> Option<String> {
    let children = document.children.borrow();
    children.iter().find_map(|child| match &child.data {
        NodeData::Doctype {
            name,
            public_id,
            system_id,
        } => {
            let mut declaration = format!("<!DOCTYPE {}", name);
            match (public_id.is_empty(), system_id.is_empty()) {
                (false, false) => {
                    declaration.push_str(&format!(" PUBLIC \"{}\" \"{}\"", public_id, system_id))
                }
                (false, true) => declaration.push_str(&format!(" PUBLIC \"{}\"", public_id)),
                (true, false) => declaration.push_str(&format!(" SYSTEM \"{}\"", system_id)),
                (true, true) => {}
            }
            declaration.push('>');
            Some(declaration)
        }
        _ => None,
    })
}
