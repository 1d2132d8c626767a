//! 工作区：打开的文件、活动文件、归档登记和扫描模式
//!
//! 所有状态由 [`Workspace`] 持有，只通过下列操作修改。

pub mod archive;
pub mod session;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub use archive::{export_flat_zip, ArchiveBundle, BundleId};
pub use session::{ArchiveMembership, BusyGuard, FileSession};

use crate::core::{EditorError, EditorResult, ScanOptions};
use crate::editor::Entry;
use crate::parsers::html::ParseOptions;
use crate::translation::batch::{translate_session, TranslationReport};
use crate::translation::client::TextTranslator;

/// 平铺导出的默认文件名
pub const DEFAULT_EXPORT_NAME: &str = "edited-htmls.zip";

/// 输入文件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Html,
    Zip,
}

impl InputKind {
    pub fn detect(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_ascii_lowercase();
        match ext.as_str() {
            "html" | "htm" => Some(InputKind::Html),
            "zip" => Some(InputKind::Zip),
            _ => None,
        }
    }
}

/// 应用状态控制器
pub struct Workspace {
    files: Vec<FileSession>,
    active: Option<usize>,
    open_counter: usize,
    bundles: HashMap<BundleId, ArchiveBundle>,
    next_bundle: BundleId,
    scan_options: ScanOptions,
    parse_options: ParseOptions,
    all_mode: bool,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(ScanOptions::default(), ParseOptions::default())
    }
}

impl Workspace {
    pub fn new(scan_options: ScanOptions, parse_options: ParseOptions) -> Self {
        Self {
            files: Vec::new(),
            active: None,
            open_counter: 0,
            bundles: HashMap::new(),
            next_bundle: 1,
            scan_options,
            parse_options,
            all_mode: false,
        }
    }

    pub fn files(&self) -> &[FileSession] {
        &self.files
    }

    pub fn file(&self, index: usize) -> Option<&FileSession> {
        self.files.get(index)
    }

    pub fn file_mut(&mut self, index: usize) -> Option<&mut FileSession> {
        self.files.get_mut(index)
    }

    pub fn bundle(&self, id: BundleId) -> Option<&ArchiveBundle> {
        self.bundles.get(&id)
    }

    pub fn scan_options(&self) -> ScanOptions {
        self.scan_options
    }

    pub fn is_all_mode(&self) -> bool {
        self.all_mode
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active(&self) -> EditorResult<&FileSession> {
        self.active
            .and_then(|i| self.files.get(i))
            .ok_or(EditorError::NoActiveSession)
    }

    pub fn active_mut(&mut self) -> EditorResult<&mut FileSession> {
        self.active
            .and_then(|i| self.files.get_mut(i))
            .ok_or(EditorError::NoActiveSession)
    }

    fn next_order(&mut self) -> usize {
        self.open_counter += 1;
        self.open_counter
    }

    /// 按扩展名打开 HTML 文件或 ZIP 归档，返回新会话的下标
    pub fn open_path(&mut self, path: &Path) -> EditorResult<Vec<usize>> {
        match InputKind::detect(path) {
            Some(InputKind::Html) => {
                let order = self.next_order();
                let session = FileSession::open(path, &self.parse_options, order)?;
                Ok(vec![self.push_session(session)])
            }
            Some(InputKind::Zip) => {
                let id = self.next_bundle;
                let bundle = ArchiveBundle::open(id, path)?;
                self.register_bundle(bundle)
            }
            None => Err(EditorError::invalid_input(format!(
                "不支持的文件类型: {}",
                path.display()
            ))),
        }
    }

    /// 打开内存中的 HTML
    pub fn open_html_bytes(&mut self, name: &str, data: &[u8]) -> usize {
        let order = self.next_order();
        let session = FileSession::from_bytes(name, data, &self.parse_options, order);
        self.push_session(session)
    }

    /// 打开内存中的 ZIP 归档，每个 HTML 成员成为一个会话
    pub fn open_zip_bytes(&mut self, name: &str, data: Vec<u8>) -> EditorResult<Vec<usize>> {
        let bundle = ArchiveBundle::from_bytes(self.next_bundle, name, data)?;
        self.register_bundle(bundle)
    }

    fn register_bundle(&mut self, bundle: ArchiveBundle) -> EditorResult<Vec<usize>> {
        let id = bundle.id();
        let members = bundle.html_members()?;
        if members.is_empty() {
            tracing::warn!("归档 {} 中没有 HTML 文件", bundle.name());
        }
        tracing::info!("已打开归档 {} ({} 个 HTML)", bundle.name(), members.len());

        self.next_bundle += 1;
        self.bundles.insert(id, bundle);

        let mut opened = Vec::with_capacity(members.len());
        for (path, data) in members {
            let order = self.next_order();
            let session = FileSession::from_bytes(&path, &data, &self.parse_options, order)
                .with_archive(ArchiveMembership { bundle: id, path });
            opened.push(self.push_session(session));
        }
        Ok(opened)
    }

    fn push_session(&mut self, session: FileSession) -> usize {
        self.files.push(session);
        let index = self.files.len() - 1;
        if self.active.is_none() {
            self.active = Some(index);
        }
        index
    }

    /// 切换活动文件并刷新扫描
    pub fn set_active(&mut self, index: usize) -> EditorResult<()> {
        if index >= self.files.len() {
            return Err(EditorError::invalid_input(format!("文件序号 {} 不存在", index)));
        }
        self.active = Some(index);
        self.rescan();
        Ok(())
    }

    /// "全部文件" 模式下扫描所有会话，否则只扫描活动会话
    pub fn set_all_mode(&mut self, all_mode: bool) {
        self.all_mode = all_mode;
        self.rescan();
    }

    /// 修改扫描选项会触发重新扫描
    pub fn set_scan_options(&mut self, options: ScanOptions) {
        if self.scan_options != options {
            self.scan_options = options;
            self.rescan();
        }
    }

    pub fn rescan(&mut self) {
        let options = self.scan_options;
        if self.all_mode {
            for session in &mut self.files {
                session.rescan(&options);
            }
        } else if let Some(session) = self.active.and_then(|i| self.files.get_mut(i)) {
            session.rescan(&options);
        }
    }

    /// 编辑活动文件中的条目
    pub fn apply_edit(&mut self, id: usize, value: &str) -> EditorResult<()> {
        let options = self.scan_options;
        let session = self.active_mut()?;
        session.ensure_scanned(&options);
        session.apply_edit(id, value)
    }

    /// 在活动文件中全量替换
    pub fn replace_all_active(&mut self, find: &str, replacement: &str) -> EditorResult<usize> {
        let options = self.scan_options;
        let session = self.active_mut()?;
        session.ensure_scanned(&options);
        session.replace_all(find, replacement)
    }

    /// 在所有文件中全量替换，返回修改的条目总数
    pub fn replace_all_files(&mut self, find: &str, replacement: &str) -> EditorResult<usize> {
        if find.is_empty() {
            return Err(EditorError::invalid_input("查找内容不能为空"));
        }
        let options = self.scan_options;
        let mut total = 0;
        for session in &mut self.files {
            session.ensure_scanned(&options);
            total += session.replace_all(find, replacement)?;
        }
        Ok(total)
    }

    /// 搜索条目；"全部文件" 模式下覆盖所有会话
    pub fn search(&self, term: &str) -> Vec<(usize, &Entry)> {
        let mut found = Vec::new();
        for (index, session) in self.files.iter().enumerate() {
            if !self.all_mode && Some(index) != self.active {
                continue;
            }
            found.extend(session.search(term).into_iter().map(|e| (index, e)));
        }
        found
    }

    /// 翻译活动文件
    pub async fn translate_active<T: TextTranslator>(
        &mut self,
        translator: &T,
        target_lang: &str,
        batch_size: usize,
    ) -> EditorResult<TranslationReport> {
        let options = self.scan_options;
        let session = self.active_mut()?;
        translate_session(session, translator, target_lang, batch_size, &options).await
    }

    /// 依次翻译所有文件，遇到第一个错误即停止
    ///
    /// 没有条目的文件直接跳过，不出现在返回的报告里。
    pub async fn translate_all<T: TextTranslator>(
        &mut self,
        translator: &T,
        target_lang: &str,
        batch_size: usize,
    ) -> EditorResult<Vec<TranslationReport>> {
        let options = self.scan_options;
        let mut reports = Vec::with_capacity(self.files.len());
        for session in &mut self.files {
            session.ensure_scanned(&options);
            if session.entries().is_empty() {
                tracing::info!("跳过 {}: 没有可翻译的条目", session.name());
                continue;
            }
            reports.push(translate_session(session, translator, target_lang, batch_size, &options).await?);
        }
        Ok(reports)
    }

    /// 保存一个会话：归档成员写回归档并重新编码，其余写到原路径或输出目录
    pub fn save(&mut self, index: usize, output_dir: Option<&Path>) -> EditorResult<PathBuf> {
        let session = self
            .files
            .get(index)
            .ok_or_else(|| EditorError::invalid_input(format!("文件序号 {} 不存在", index)))?;

        match session.archive().map(|m| m.bundle) {
            Some(bundle_id) => {
                self.write_back(bundle_id)?;
                self.save_bundle(bundle_id, output_dir)
            }
            None => {
                let session = &mut self.files[index];
                session.save(output_dir)
            }
        }
    }

    /// 保存所有有修改的会话，返回写入的路径
    pub fn save_all(&mut self, output_dir: Option<&Path>) -> EditorResult<Vec<PathBuf>> {
        let mut written = Vec::new();

        for session in self.files.iter_mut().filter(|s| s.is_dirty() && s.archive().is_none()) {
            written.push(session.save(output_dir)?);
        }

        let mut dirty_bundles: Vec<BundleId> = self
            .files
            .iter()
            .filter(|s| s.is_dirty())
            .filter_map(|s| s.archive().map(|m| m.bundle))
            .collect();
        dirty_bundles.sort_unstable();
        dirty_bundles.dedup();

        for bundle_id in dirty_bundles {
            self.write_back(bundle_id)?;
            written.push(self.save_bundle(bundle_id, output_dir)?);
        }

        Ok(written)
    }

    /// 把归档中有修改的成员写入归档（不落盘）
    fn write_back(&mut self, bundle_id: BundleId) -> EditorResult<()> {
        let bundle = self
            .bundles
            .get_mut(&bundle_id)
            .ok_or_else(|| EditorError::Archive(format!("归档 #{} 不存在", bundle_id)))?;

        for session in self.files.iter().filter(|s| s.is_dirty()) {
            if let Some(membership) = session.archive().filter(|m| m.bundle == bundle_id) {
                bundle.write_member(&membership.path, session.serialize()?);
            }
        }
        Ok(())
    }

    fn save_bundle(&mut self, bundle_id: BundleId, output_dir: Option<&Path>) -> EditorResult<PathBuf> {
        let bundle = self
            .bundles
            .get_mut(&bundle_id)
            .ok_or_else(|| EditorError::Archive(format!("归档 #{} 不存在", bundle_id)))?;

        let target = match (output_dir, bundle.source()) {
            (Some(dir), _) => dir.join(bundle.name()),
            (None, Some(source)) => source.to_path_buf(),
            (None, None) => {
                return Err(EditorError::invalid_input(format!(
                    "归档 {} 没有可写入的位置",
                    bundle.name()
                )))
            }
        };
        bundle.save_to(&target)?;

        for session in self.files.iter_mut() {
            if session.archive().is_some_and(|m| m.bundle == bundle_id) {
                session.mark_saved();
            }
        }
        Ok(target)
    }

    /// 导出归档：写回修改过的成员后重新编码整个归档
    pub fn export_bundle(&mut self, bundle_id: BundleId) -> EditorResult<Vec<u8>> {
        self.write_back(bundle_id)?;
        let bundle = self
            .bundles
            .get(&bundle_id)
            .ok_or_else(|| EditorError::Archive(format!("归档 #{} 不存在", bundle_id)))?;
        bundle.encode()
    }

    /// 所有会话平铺导出为一个 ZIP
    pub fn export_flat_zip(&self) -> EditorResult<Vec<u8>> {
        let documents = self
            .files
            .iter()
            .map(|s| Ok((s.name().to_string(), s.serialize()?)))
            .collect::<EditorResult<Vec<_>>>()?;
        export_flat_zip(&documents)
    }
}
