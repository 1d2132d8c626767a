//! ZIP 归档的打开、写回和导出

mod common;

use htmledit::workspace::archive::ArchiveBundle;
use htmledit::{EditorError, ScanOptions, Workspace};

use common::ZipTestHelper;

#[cfg(test)]
mod passing {
    use super::*;

    #[test]
    fn each_html_member_becomes_a_session() {
        let bytes = ZipTestHelper::build(&[
            ("site/index.html", "<html><body><p>Home page</p></body></html>"),
            ("site/style.css", "p { color: red }"),
            ("site/about.htm", "<html><body><p>About us</p></body></html>"),
        ]);

        let mut workspace = Workspace::default();
        let opened = workspace.open_zip_bytes("site.zip", bytes).unwrap();
        assert_eq!(opened.len(), 2);

        let names: Vec<&str> = workspace.files().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["site/index.html", "site/about.htm"]);
        assert!(workspace
            .files()
            .iter()
            .all(|s| s.archive().map(|m| m.bundle) == Some(1)));
    }

    #[test]
    fn export_bundle_writes_back_edited_members() {
        let bytes = ZipTestHelper::build(&[
            ("index.html", "<html><body><p>Home page</p></body></html>"),
            ("about.html", "<html><body><p>About us</p></body></html>"),
            ("logo.svg", "<svg></svg>"),
        ]);

        let mut workspace = Workspace::default();
        workspace.open_zip_bytes("site.zip", bytes).unwrap();
        workspace.rescan();
        workspace.apply_edit(1, "Start page").unwrap();

        let exported = workspace.export_bundle(1).unwrap();
        assert_eq!(
            ZipTestHelper::member_names(&exported),
            vec!["index.html", "about.html", "logo.svg"]
        );
        assert_eq!(
            ZipTestHelper::read_member(&exported, "index.html"),
            "<html><head></head><body><p>Start page</p></body></html>"
        );
        assert_eq!(
            ZipTestHelper::read_member(&exported, "about.html"),
            "<html><body><p>About us</p></body></html>"
        );
        assert_eq!(ZipTestHelper::read_member(&exported, "logo.svg"), "<svg></svg>");
    }

    #[test]
    fn save_all_rewrites_archive_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = ZipTestHelper::write(
            dir.path(),
            "site.zip",
            &[("docs/page.html", "<html><body><p>Old words here</p></body></html>")],
        );

        let mut workspace = Workspace::default();
        workspace.open_path(&path).unwrap();
        assert_eq!(workspace.replace_all_files("Old", "New").unwrap(), 1);

        let written = workspace.save_all(None).unwrap();
        assert_eq!(written, vec![path.clone()]);
        assert!(workspace.files().iter().all(|s| !s.is_dirty()));

        let bytes = std::fs::read(&path).unwrap();
        assert!(ZipTestHelper::read_member(&bytes, "docs/page.html").contains("New words here"));
    }

    #[test]
    fn flat_export_of_mixed_sources() {
        let mut workspace = Workspace::default();
        workspace.open_html_bytes("index.html", b"<html><body><p>Loose file</p></body></html>");
        workspace
            .open_zip_bytes(
                "bundle.zip",
                ZipTestHelper::build(&[("nested/dir/page.html", "<p>Inside</p>")]),
            )
            .unwrap();

        let exported = workspace.export_flat_zip().unwrap();
        assert_eq!(
            ZipTestHelper::member_names(&exported),
            vec!["index.html", "nested_dir_page.html"]
        );
    }

    #[test]
    fn scan_options_apply_to_archive_members() {
        let mut workspace = Workspace::new(
            ScanOptions {
                include_attributes: true,
                hide_short: true,
            },
            Default::default(),
        );
        workspace
            .open_zip_bytes(
                "a.zip",
                ZipTestHelper::build(&[("a.html", "<html><body><img alt=\"Alt text\"></body></html>")]),
            )
            .unwrap();
        workspace.rescan();
        assert_eq!(workspace.active().unwrap().entries()[0].snippet(), "Alt text");
    }
}

#[cfg(test)]
mod failing {
    use super::*;

    #[test]
    fn corrupt_archive() {
        let mut workspace = Workspace::default();
        assert!(matches!(
            workspace.open_zip_bytes("bad.zip", b"PK not really".to_vec()),
            Err(EditorError::Archive(_))
        ));
        assert!(workspace.files().is_empty());
        assert!(matches!(
            ArchiveBundle::from_bytes(7, "bad.zip", Vec::new()),
            Err(EditorError::Archive(_))
        ));
    }

    #[test]
    fn unknown_bundle() {
        let mut workspace = Workspace::default();
        assert!(matches!(
            workspace.export_bundle(42),
            Err(EditorError::Archive(_))
        ));
    }

    #[test]
    fn in_memory_archive_has_no_save_location() {
        let mut workspace = Workspace::default();
        workspace
            .open_zip_bytes("mem.zip", ZipTestHelper::build(&[("a.html", "<p>Some text</p>")]))
            .unwrap();
        workspace.replace_all_files("Some", "Any").unwrap();
        assert!(matches!(
            workspace.save_all(None),
            Err(EditorError::InvalidInput(_))
        ));
    }

    #[test]
    fn empty_workspace_cannot_export() {
        assert!(matches!(
            Workspace::default().export_flat_zip(),
            Err(EditorError::InvalidInput(_))
        ));
    }
}
