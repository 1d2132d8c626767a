//! ZIP 归档
//!
//! 打开的归档保存原始字节；修改过的成员先写入 `pending`，导出时与未修改的
//! 成员一起重新编码。

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::core::{flatten_member_name, EditorError, EditorResult};

/// 归档标识，会话通过它引用所属归档
pub type BundleId = usize;

/// 是否是需要打开编辑的 HTML 成员
pub fn is_html_member(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    if lower.ends_with('/') || lower.starts_with("__macosx/") || lower.contains("/__macosx/") {
        return false;
    }
    lower.ends_with(".html") || lower.ends_with(".htm")
}

/// 一个打开的 ZIP 归档
#[derive(Debug, Clone)]
pub struct ArchiveBundle {
    id: BundleId,
    name: String,
    source: Option<PathBuf>,
    bytes: Vec<u8>,
    pending: BTreeMap<String, String>,
}

impl ArchiveBundle {
    /// 从内存字节创建，立即校验归档结构
    pub fn from_bytes(id: BundleId, name: &str, bytes: Vec<u8>) -> EditorResult<Self> {
        ZipArchive::new(Cursor::new(bytes.as_slice()))?;

        Ok(Self {
            id,
            name: name.to_string(),
            source: None,
            bytes,
            pending: BTreeMap::new(),
        })
    }

    /// 从磁盘打开
    pub fn open(id: BundleId, path: &Path) -> EditorResult<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "bundle.zip".to_string());

        let mut bundle = Self::from_bytes(id, &name, bytes)?;
        bundle.source = Some(path.to_path_buf());
        Ok(bundle)
    }

    pub fn id(&self) -> BundleId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// 读取所有 HTML 成员（归档内路径，原始字节），按归档顺序
    pub fn html_members(&self) -> EditorResult<Vec<(String, Vec<u8>)>> {
        let mut archive = ZipArchive::new(Cursor::new(self.bytes.as_slice()))?;
        let mut members = Vec::new();

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() || !is_html_member(file.name()) {
                continue;
            }
            let path = file.name().to_string();
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            members.push((path, data));
        }

        tracing::debug!("归档 {} 包含 {} 个 HTML 成员", self.name, members.len());
        Ok(members)
    }

    /// 写回修改后的成员内容
    pub fn write_member(&mut self, path: &str, content: String) {
        self.pending.insert(path.to_string(), content);
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// 重新编码整个归档：已修改的成员使用新内容，其余成员原样复制
    pub fn encode(&self) -> EditorResult<Vec<u8>> {
        let mut archive = ZipArchive::new(Cursor::new(self.bytes.as_slice()))?;
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for i in 0..archive.len() {
            let file = archive.by_index_raw(i)?;
            let name = file.name().to_string();
            match self.pending.get(&name) {
                Some(content) => {
                    writer.start_file(name, options)?;
                    writer.write_all(content.as_bytes())?;
                }
                None => writer.raw_copy_file(file)?,
            }
        }

        let cursor = writer.finish()?;
        Ok(cursor.into_inner())
    }

    /// 编码后写入文件，并以新内容作为后续导出的基础
    pub fn save_to(&mut self, path: &Path) -> EditorResult<()> {
        let encoded = self.encode()?;
        std::fs::write(path, &encoded)?;
        tracing::info!("已写入归档: {}", path.display());

        self.bytes = encoded;
        self.pending.clear();
        Ok(())
    }
}

/// 把若干文档打包成平铺的 ZIP（成员名中的 `/` 和 `\` 替换为 `_`）
///
/// 同名成员以后出现的内容为准。
pub fn export_flat_zip(documents: &[(String, String)]) -> EditorResult<Vec<u8>> {
    if documents.is_empty() {
        return Err(EditorError::invalid_input("没有打开的文件"));
    }

    let mut members: Vec<(String, &str)> = Vec::new();
    for (name, html) in documents {
        let flat = flatten_member_name(name);
        match members.iter_mut().find(|(existing, _)| *existing == flat) {
            Some(member) => member.1 = html.as_str(),
            None => members.push((flat, html.as_str())),
        }
    }

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, html) in &members {
        writer.start_file(name.as_str(), options)?;
        writer.write_all(html.as_bytes())?;
    }

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}
