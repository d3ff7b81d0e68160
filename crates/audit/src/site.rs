//! Site snapshot loading: a built site as `{relative path → content}`.
//!
//! Accepts either a directory (the deploy staging tree) or a `.zip`
//! archive (the artifact actually uploaded). Only text files the checks
//! read are kept: every `.html` page plus `sitemap.xml`, `robots.txt`,
//! and `llms.txt`.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Component, Path};

use tracing::debug;

use crate::{AuditError, AuditResult};

/// Non-HTML files the checks consume.
const EXTRA_FILES: &[&str] = &["sitemap.xml", "robots.txt", "llms.txt"];

/// An in-memory view of a built site.
#[derive(Debug, Default)]
pub struct SiteSnapshot {
    files: BTreeMap<String, String>,
}

impl SiteSnapshot {
    /// Load from a directory or a `.zip` archive, by extension.
    pub fn load(path: &Path) -> AuditResult<Self> {
        if path.is_dir() {
            Self::from_dir(path)
        } else if path.extension().map(|e| e == "zip").unwrap_or(false) {
            Self::from_zip(path)
        } else {
            Err(AuditError::UnsupportedInput(format!(
                "{} is neither a directory nor a .zip archive",
                path.display()
            )))
        }
    }

    pub fn from_dir(dir: &Path) -> AuditResult<Self> {
        let mut files = BTreeMap::new();
        for entry in walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let relative = entry
                .path()
                .strip_prefix(dir)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .replace('\\', "/");
            if wanted(&relative) {
                files.insert(relative, std::fs::read_to_string(entry.path())?);
            }
        }
        debug!(count = files.len(), "site snapshot loaded from directory");
        Ok(Self { files })
    }

    pub fn from_zip(path: &Path) -> AuditResult<Self> {
        let file = std::fs::File::open(path)?;
        let mut archive = zip::ZipArchive::new(file)?;
        let mut files = BTreeMap::new();
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            if !entry.is_file() {
                continue;
            }
            let name = entry.name().to_string();
            if name.split('/').any(|part| part == "..") || Path::new(&name).components().any(|c| !matches!(c, Component::Normal(_))) {
                return Err(AuditError::PathTraversal(name));
            }
            if wanted(&name) {
                let mut content = String::new();
                // pages are UTF-8; anything else is replaced, not fatal
                let mut raw = Vec::new();
                entry.read_to_end(&mut raw)?;
                content.push_str(&String::from_utf8_lossy(&raw));
                files.insert(name, content);
            }
        }
        debug!(count = files.len(), "site snapshot loaded from archive");
        Ok(Self { files })
    }

    /// Build a snapshot from in-memory pages. Used by tests and by the
    /// injector when rewriting pages.
    pub fn from_pages<I, K, V>(pages: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            files: pages
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.files.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Every file, sorted by path.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Every `.html` page, sorted by path.
    pub fn html_pages(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter(|(name, _)| name.ends_with(".html"))
    }

    /// Blog article pages (`blog/*.html`).
    pub fn blog_pages(&self) -> impl Iterator<Item = (&str, &str)> {
        self.html_pages().filter(|(name, _)| name.starts_with("blog/"))
    }
}

fn wanted(name: &str) -> bool {
    name.ends_with(".html") || EXTRA_FILES.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn directory_snapshot_keeps_html_and_extras() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        std::fs::create_dir(dir.path().join("blog")).unwrap();
        std::fs::write(dir.path().join("blog/post.html"), "<html></html>").unwrap();
        std::fs::write(dir.path().join("sitemap.xml"), "<urlset/>").unwrap();
        std::fs::write(dir.path().join("app.js"), "ignored").unwrap();

        let site = SiteSnapshot::from_dir(dir.path()).unwrap();
        assert_eq!(site.len(), 3);
        assert!(site.contains("blog/post.html"));
        assert!(!site.contains("app.js"));
        assert_eq!(site.blog_pages().count(), 1);
    }

    #[test]
    fn zip_snapshot_matches_directory_semantics() {
        let dir = tempfile::tempdir().unwrap();
        let archive_path = dir.path().join("site.zip");
        let file = std::fs::File::create(&archive_path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        writer.start_file("index.html", options).unwrap();
        writer.write_all(b"<html>home</html>").unwrap();
        writer.start_file("llms.txt", options).unwrap();
        writer.write_all(b"compress-pdf").unwrap();
        writer.start_file("style.css", options).unwrap();
        writer.write_all(b"body{}").unwrap();
        writer.finish().unwrap();

        let site = SiteSnapshot::load(&archive_path).unwrap();
        assert_eq!(site.len(), 2);
        assert_eq!(site.get("index.html"), Some("<html>home</html>"));
    }

    #[test]
    fn zip_with_traversal_entry_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let archive_path = dir.path().join("evil.zip");
        let file = std::fs::File::create(&archive_path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        writer.start_file("../outside.html", options).unwrap();
        writer.write_all(b"<html></html>").unwrap();
        writer.finish().unwrap();

        let err = SiteSnapshot::load(&archive_path).unwrap_err();
        assert!(matches!(err, AuditError::PathTraversal(_)));
    }

    #[test]
    fn unsupported_input_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let tarball = dir.path().join("site.tar.gz");
        std::fs::write(&tarball, b"not an archive we read").unwrap();
        assert!(matches!(
            SiteSnapshot::load(&tarball).unwrap_err(),
            AuditError::UnsupportedInput(_)
        ));
    }
}
