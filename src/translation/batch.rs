//! 批次翻译
//!
//! 把会话条目的片段按批次发送给翻译接口，逐批校验后写回文档。
//! 中途失败时已写入的批次保留，不回滚。

use std::time::{Duration, Instant};

use super::client::TextTranslator;
use super::error::helpers;
use crate::core::{EditorError, EditorResult, ScanOptions};
use crate::editor;
use crate::workspace::FileSession;

/// 一次会话翻译的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationReport {
    pub file: String,
    pub entries: usize,
    pub batches: usize,
    pub elapsed: Duration,
}

/// 批次划分：返回每个批次在条目列表中的起止范围
pub fn batch_ranges(len: usize, batch_size: usize) -> Vec<(usize, usize)> {
    if batch_size == 0 {
        return Vec::new();
    }
    (0..len)
        .step_by(batch_size)
        .map(|start| (start, (start + batch_size).min(len)))
        .collect()
}

/// 翻译一个会话的所有条目
///
/// 翻译期间会话处于忙碌状态，其他编辑和翻译请求会被拒绝。
pub async fn translate_session<T: TextTranslator>(
    session: &mut FileSession,
    translator: &T,
    target_lang: &str,
    batch_size: usize,
    options: &ScanOptions,
) -> EditorResult<TranslationReport> {
    if target_lang.trim().is_empty() {
        return Err(EditorError::invalid_input("目标语言不能为空"));
    }
    if batch_size == 0 {
        return Err(EditorError::invalid_input("批次大小必须大于 0"));
    }

    let _guard = session.begin_translation()?;
    session.ensure_scanned(options);

    let texts: Vec<String> = session
        .entries()
        .iter()
        .map(|e| e.snippet().to_string())
        .collect();
    if texts.is_empty() {
        return Err(EditorError::invalid_input(format!(
            "{} 没有可翻译的条目",
            session.name()
        )));
    }

    let ranges = batch_ranges(texts.len(), batch_size);
    let total = ranges.len();
    let started = Instant::now();
    tracing::info!(
        "开始翻译 {}: {} 个条目, {} 个批次, 目标语言 {}",
        session.name(),
        texts.len(),
        total,
        target_lang
    );

    for (index, &(start, end)) in ranges.iter().enumerate() {
        let context = format!("{} 批次 {}/{}", session.name(), index + 1, total);
        let chunk = &texts[start..end];

        let translated = match translator.translate_texts(chunk, target_lang).await {
            Ok(translated) if translated.len() == chunk.len() => translated,
            Ok(translated) => {
                let error = helpers::contract_error(format!(
                    "期望 {} 条译文，实际 {} 条",
                    chunk.len(),
                    translated.len()
                ))
                .with_context(&context);
                return helpers::log_error(error).map_err(EditorError::from);
            }
            Err(error) => {
                return helpers::log_error(error.with_context(&context)).map_err(EditorError::from)
            }
        };

        for (entry, value) in session.entries_mut()[start..end].iter_mut().zip(&translated) {
            editor::apply_edit(entry, value)?;
        }
        session.mark_dirty();
        tracing::debug!("{} 已写入", context);
    }

    session.rescan(options);
    let report = TranslationReport {
        file: session.name().to_string(),
        entries: texts.len(),
        batches: total,
        elapsed: started.elapsed(),
    };
    tracing::info!(
        "翻译完成 {}: {} 个条目, 耗时 {:?}",
        report.file,
        report.entries,
        report.elapsed
    );
    Ok(report)
}
