// 集成测试公共模块
//
// 提供测试辅助工具和共享功能

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::RcDom;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use htmledit::workspace::FileSession;
use htmledit::{ParseOptions, ScanOptions};

/// HTML测试辅助工具
pub struct HtmlTestHelper;

impl HtmlTestHelper {
    /// 创建测试用的DOM结构
    pub fn create_test_dom(html: &str) -> RcDom {
        let mut input = Cursor::new(html);
        parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut input)
            .unwrap()
    }

    /// 创建已扫描的会话
    pub fn scanned_session(html: &str, options: ScanOptions) -> FileSession {
        let mut session =
            FileSession::from_bytes("page.html", html.as_bytes(), &ParseOptions::default(), 1);
        session.rescan(&options);
        session
    }

    /// 创建简单的英文HTML页面
    pub fn create_simple_english_page() -> String {
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <title>Test Page</title>
    <meta charset="UTF-8">
    <style>h1 { color: red; }</style>
</head>
<body>
    <h1>Welcome to Test</h1>
    <p>This is a test paragraph with some <strong>important</strong> text.</p>
    <div id="main">
        <p>Another paragraph in a div.</p>
        <a href="https://example.com" title="Example Link">Visit Example</a>
    </div>
    <button aria-label="Close dialog">OK</button>
    <img src="test.jpg" alt="Test Image">
    <script>console.log("not text");</script>
</body>
</html>"#
            .to_string()
    }

    /// 创建包含隐藏内容的页面
    pub fn create_page_with_hidden_content() -> String {
        r#"<html><body>
    <p>Shown paragraph</p>
    <div style="display: none"><p>Hidden by display</p></div>
    <div style="visibility:hidden"><span>Hidden by visibility</span></div>
    <section hidden><p>Hidden by attribute</p></section>
    <noscript>Enable scripts please</noscript>
    <template><p>Template text</p></template>
</body></html>"#
            .to_string()
    }

    pub fn snippets(session: &FileSession) -> Vec<String> {
        session
            .entries()
            .iter()
            .map(|e| e.snippet().to_string())
            .collect()
    }

    pub fn live_values(session: &FileSession) -> Vec<String> {
        session
            .entries()
            .iter()
            .map(|e| e.live_value().unwrap_or_default())
            .collect()
    }
}

/// ZIP测试辅助工具
pub struct ZipTestHelper;

impl ZipTestHelper {
    pub fn build(files: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in files {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    pub fn write(dir: &Path, name: &str, files: &[(&str, &str)]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, Self::build(files)).unwrap();
        path
    }

    pub fn read_member(bytes: &[u8], name: &str) -> String {
        use std::io::Read;

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        content
    }

    pub fn member_names(bytes: &[u8]) -> Vec<String> {
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        archive.file_names().map(String::from).collect()
    }
}
