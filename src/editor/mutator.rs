use super::entry::Entry;
use crate::core::{EditorError, EditorResult};

/// 将新值原样写入条目引用的节点，并同步缓存的片段和长度
pub fn apply_edit(entry: &mut Entry, value: &str) -> EditorResult<()> {
    entry.write(value)
}

/// 字面量全量替换（不支持正则）
///
/// 只有替换结果与当前值不同的条目才会写入。返回实际修改的条目数。
pub fn replace_all(entries: &mut [Entry], find: &str, replacement: &str) -> EditorResult<usize> {
    if find.is_empty() {
        return Err(EditorError::invalid_input("查找内容不能为空"));
    }

    let mut changed = 0;
    for entry in entries.iter_mut() {
        if !entry.snippet().contains(find) {
            continue;
        }
        let updated = entry.snippet().replace(find, replacement);
        if updated != entry.snippet() {
            apply_edit(entry, &updated)?;
            changed += 1;
        }
    }

    tracing::debug!("替换 '{}' -> '{}': {} 个条目", find, replacement, changed);
    Ok(changed)
}
