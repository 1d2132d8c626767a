//! 模型回复解析
//!
//! 先按严格 JSON 解析，失败时取回复中第一个括号配对完整的数组或对象，
//! 最后校验形状和数量。

use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplyError {
    #[error("回复中没有可解析的 JSON")]
    NoJson,

    #[error("回复不是字符串数组")]
    WrongShape,

    #[error("条目数量不一致: 期望 {expected}，实际 {actual}")]
    CountMismatch { expected: usize, actual: usize },
}

/// 去掉包裹整段回复的 Markdown 代码块
pub fn unwrap_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };

    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => "",
    };
    let body = match body.rfind("```") {
        Some(pos) => &body[..pos],
        None => body,
    };
    body.trim().to_string()
}

/// 找到第一个括号配对完整的 `[...]` 或 `{...}`，字符串内的括号不计
pub fn extract_balanced_json(text: &str) -> Option<&str> {
    let start = text.find(|c| c == '[' || c == '{')?;
    let mut stack = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '[' => stack.push(']'),
            '{' => stack.push('}'),
            ']' | '}' => {
                if stack.pop() != Some(ch) {
                    return None;
                }
                if stack.is_empty() {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_value(reply: &str) -> Result<Value, ReplyError> {
    let cleaned = unwrap_code_fences(reply);
    if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
        if value.is_array() || value.is_object() {
            return Ok(value);
        }
    }

    let candidate = extract_balanced_json(&cleaned).ok_or(ReplyError::NoJson)?;
    serde_json::from_str(candidate).map_err(|_| ReplyError::NoJson)
}

/// 把模型回复解析为与输入等长的译文列表
///
/// 接受 `["..."]` 或 `{"texts": ["..."]}` 两种形状。
pub fn parse_translated_texts(reply: &str, expected: usize) -> Result<Vec<String>, ReplyError> {
    let value = parse_value(reply)?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("texts") {
            Some(Value::Array(items)) => items,
            _ => return Err(ReplyError::WrongShape),
        },
        _ => return Err(ReplyError::WrongShape),
    };

    let texts = items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => Ok(s),
            _ => Err(ReplyError::WrongShape),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if texts.len() != expected {
        return Err(ReplyError::CountMismatch {
            expected,
            actual: texts.len(),
        });
    }
    Ok(texts)
}
