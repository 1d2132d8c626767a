use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use markup5ever_rcdom::RcDom;

use super::archive::BundleId;
use crate::core::{flatten_member_name, EditorError, EditorResult, ScanOptions};
use crate::editor::{self, Entry};
use crate::parsers::html::{html_to_dom, serialize_document, ParseOptions};

/// 会话所属归档及其在归档内的路径
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMembership {
    pub bundle: BundleId,
    pub path: String,
}

/// 翻译进行中的标记，离开作用域时自动清除
#[derive(Debug)]
pub struct BusyGuard {
    flag: Rc<Cell<bool>>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

/// 一个打开的 HTML 文件
pub struct FileSession {
    name: String,
    source: Option<PathBuf>,
    dom: RcDom,
    entries: Vec<Entry>,
    scanned: bool,
    dirty: bool,
    opened_order: usize,
    archive: Option<ArchiveMembership>,
    parse_options: ParseOptions,
    busy: Rc<Cell<bool>>,
}

impl FileSession {
    /// 从内存字节创建会话（例如归档成员）
    pub fn from_bytes(
        name: &str,
        data: &[u8],
        parse_options: &ParseOptions,
        opened_order: usize,
    ) -> Self {
        Self {
            name: name.to_string(),
            source: None,
            dom: html_to_dom(data, parse_options),
            entries: Vec::new(),
            scanned: false,
            dirty: false,
            opened_order,
            archive: None,
            parse_options: parse_options.clone(),
            busy: Rc::new(Cell::new(false)),
        }
    }

    /// 从磁盘打开
    pub fn open(path: &Path, parse_options: &ParseOptions, opened_order: usize) -> EditorResult<Self> {
        let data = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file.html".to_string());

        let mut session = Self::from_bytes(&name, &data, parse_options, opened_order);
        session.source = Some(path.to_path_buf());
        tracing::info!("已打开: {}", path.display());
        Ok(session)
    }

    pub fn with_archive(mut self, membership: ArchiveMembership) -> Self {
        self.archive = Some(membership);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn archive(&self) -> Option<&ArchiveMembership> {
        self.archive.as_ref()
    }

    pub fn opened_order(&self) -> usize {
        self.opened_order
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entry(&self, id: usize) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_scanned(&self) -> bool {
        self.scanned
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    pub fn document(&self) -> &RcDom {
        &self.dom
    }

    /// 重新扫描，旧条目全部丢弃
    pub fn rescan(&mut self, options: &ScanOptions) {
        self.entries = editor::scan(&self.dom, options);
        self.scanned = true;
        tracing::debug!("{}: {} 个条目", self.name, self.entries.len());
    }

    /// 没有扫描结果时扫描一次
    pub fn ensure_scanned(&mut self, options: &ScanOptions) {
        if !self.scanned {
            self.rescan(options);
        }
    }

    /// 标记进入翻译；已在翻译中时返回 [`EditorError::SessionBusy`]
    pub fn begin_translation(&self) -> EditorResult<BusyGuard> {
        self.check_idle()?;
        self.busy.set(true);
        Ok(BusyGuard {
            flag: Rc::clone(&self.busy),
        })
    }

    fn check_idle(&self) -> EditorResult<()> {
        if self.busy.get() {
            return Err(EditorError::SessionBusy(self.name.clone()));
        }
        Ok(())
    }

    /// 编辑单个条目
    pub fn apply_edit(&mut self, id: usize, value: &str) -> EditorResult<()> {
        self.check_idle()?;
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(EditorError::UnknownEntry(id))?;

        editor::apply_edit(entry, value)?;
        self.dirty = true;
        Ok(())
    }

    /// 在本会话内做字面量全量替换
    pub fn replace_all(&mut self, find: &str, replacement: &str) -> EditorResult<usize> {
        self.check_idle()?;
        let changed = editor::replace_all(&mut self.entries, find, replacement)?;
        if changed > 0 {
            self.dirty = true;
        }
        Ok(changed)
    }

    /// 片段包含关键字（不区分大小写）的条目
    pub fn search(&self, term: &str) -> Vec<&Entry> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return self.entries.iter().collect();
        }
        self.entries
            .iter()
            .filter(|e| e.snippet().to_lowercase().contains(&needle))
            .collect()
    }

    /// 翻译批次写入使用，调用方持有 [`BusyGuard`]
    pub(crate) fn entries_mut(&mut self) -> &mut [Entry] {
        &mut self.entries
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// 序列化当前文档
    pub fn serialize(&self) -> EditorResult<String> {
        Ok(serialize_document(&self.dom)?)
    }

    /// 保存到输出目录或原始路径，返回写入的路径
    pub fn save(&mut self, output_dir: Option<&Path>) -> EditorResult<PathBuf> {
        let target = match (output_dir, &self.source) {
            (Some(dir), _) => dir.join(flatten_member_name(&self.name)),
            (None, Some(source)) => source.clone(),
            (None, None) => {
                return Err(EditorError::invalid_input(format!(
                    "{} 没有可写入的位置",
                    self.name
                )))
            }
        };

        let html = self.serialize()?;
        std::fs::write(&target, html)?;
        self.dirty = false;
        tracing::info!("已保存: {}", target.display());
        Ok(target)
    }

    /// 从原始路径重新加载，丢弃未保存的修改
    pub fn reload(&mut self, options: &ScanOptions) -> EditorResult<()> {
        self.check_idle()?;
        let source = self
            .source
            .clone()
            .ok_or_else(|| EditorError::invalid_input(format!("{} 没有原始文件", self.name)))?;

        let data = std::fs::read(&source)?;
        self.dom = html_to_dom(&data, &self.parse_options);
        self.dirty = false;
        self.rescan(options);
        tracing::info!("已重新加载: {}", source.display());
        Ok(())
    }
}
