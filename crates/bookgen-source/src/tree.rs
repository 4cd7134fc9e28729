//! Page tree snapshot: every page of an export keyed by normalized id.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::block::SourcePage;
use crate::id::normalize_id;

/// Error loading a page tree snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Directory or file could not be read.
    #[error("I/O error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A snapshot file is not a valid page.
    #[error("invalid page snapshot {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Two pages normalize to the same id.
    #[error("duplicate page id {0}")]
    DuplicatePage(String),
}

/// Read-only id → page mapping for a whole export.
#[derive(Debug, Default)]
pub struct SourceTree {
    pages: HashMap<String, SourcePage>,
}

impl SourceTree {
    /// Build a tree from pages.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::DuplicatePage` if two pages share a normalized id.
    pub fn from_pages(pages: impl IntoIterator<Item = SourcePage>) -> Result<Self, SourceError> {
        let mut map = HashMap::new();
        for mut page in pages {
            if page.content_ids.is_empty() {
                page.content_ids = page.content.iter().map(|b| b.id.clone()).collect();
            }
            let id = normalize_id(&page.id);
            if map.insert(id.clone(), page).is_some() {
                return Err(SourceError::DuplicatePage(id));
            }
        }
        Ok(Self { pages: map })
    }

    /// Load every `*.json` file in `dir` as one page.
    ///
    /// Files are read in name order so duplicate detection is deterministic.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or a file cannot be read, a file is
    /// not a valid page, or two pages share an id.
    pub fn load_dir(dir: &Path) -> Result<Self, SourceError> {
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source: std::io::Error| SourceError::Io { path, source }
        };

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_err(dir))? {
            let path = entry.map_err(io_err(dir))?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        files.sort();

        let mut pages = Vec::with_capacity(files.len());
        for path in files {
            let content = std::fs::read_to_string(&path).map_err(io_err(&path))?;
            let page: SourcePage = serde_json::from_str(&content)
                .map_err(|source| SourceError::Json { path, source })?;
            pages.push(page);
        }

        let tree = Self::from_pages(pages)?;
        tracing::debug!(dir = %dir.display(), page_count = tree.len(), "Loaded page snapshot");
        Ok(tree)
    }

    /// Look up a page by id in any accepted form.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&SourcePage> {
        self.pages.get(&normalize_id(id))
    }

    /// Number of pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// True if the tree holds no pages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::block::Block;

    #[test]
    fn test_get_accepts_any_id_form() {
        let tree = SourceTree::from_pages([SourcePage::new("AB-cd", "Root", vec![])]).unwrap();
        assert!(tree.get("abcd").is_some());
        assert!(tree.get("A-B-C-D").is_some());
        assert!(tree.get("abce").is_none());
    }

    #[test]
    fn test_from_pages_rejects_duplicates() {
        let result = SourceTree::from_pages([
            SourcePage::new("ab-cd", "One", vec![]),
            SourcePage::new("ABCD", "Two", vec![]),
        ]);
        assert!(matches!(result, Err(SourceError::DuplicatePage(id)) if id == "abcd"));
    }

    #[test]
    fn test_from_pages_fills_missing_content_ids() {
        let mut page = SourcePage::new("p", "Page", vec![Block::text("t1", "hi")]);
        page.content_ids.clear();
        let tree = SourceTree::from_pages([page]).unwrap();
        assert_eq!(tree.get("p").unwrap().content_ids, vec!["t1".to_owned()]);
    }

    #[test]
    fn test_load_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(
            temp_dir.path().join("root.json"),
            r#"{
                "id": "1111-2222",
                "title": "Go",
                "content": [
                    { "id": "t1", "type": "text", "inline": [{ "text": "$id: 1" }] },
                    { "id": "3333", "type": "page" }
                ]
            }"#,
        )
        .unwrap();
        fs::write(
            temp_dir.path().join("child.json"),
            r#"{ "id": "3333", "type": "page", "title": "Basics" }"#,
        )
        .unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "ignored").unwrap();

        let tree = SourceTree::load_dir(temp_dir.path()).unwrap();

        assert_eq!(tree.len(), 2);
        let root = tree.get("11112222").unwrap();
        assert_eq!(root.title, "Go");
        assert_eq!(root.content.len(), 2);
        assert_eq!(root.content_ids, vec!["t1".to_owned(), "3333".to_owned()]);
        assert_eq!(tree.get("3333").unwrap().title, "Basics");
    }

    #[test]
    fn test_load_dir_invalid_json_names_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("broken.json"), "{ not json").unwrap();

        let err = SourceTree::load_dir(temp_dir.path()).unwrap_err();

        assert!(matches!(err, SourceError::Json { .. }));
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_load_dir_missing_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = SourceTree::load_dir(&temp_dir.path().join("missing"));
        assert!(matches!(result, Err(SourceError::Io { .. })));
    }
}
