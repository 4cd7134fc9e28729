//! Output page tree.

use std::path::PathBuf;

use bookgen_source::Block;
use serde::Serialize;

/// A source file shown by an embed block.
///
/// One is recorded for every embed block, whether or not it could be
/// resolved. Unresolved entries have `file_exists == false` and carry the
/// reason in `error`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EmbeddedSourceFile {
    /// Embed URL exactly as found in the block.
    pub embed_url: String,
    /// File name of the resolved path (empty if unresolved).
    pub file_name: String,
    /// Absolute path of the resolved file (empty if unresolved).
    pub path: PathBuf,
    /// Filtered file content.
    pub lines: Vec<String>,
    pub file_exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A page of a book.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Page {
    pub title: String,
    /// Normalized id of the source page.
    pub notion_id: String,
    /// `notion_id` of the parent page, `None` for the root.
    pub parent_id: Option<String>,
    /// Legacy id from `$id`, used for redirects.
    pub id: Option<String>,
    /// Stack Overflow documentation id from `$soid`.
    pub stack_overflow_id: Option<String>,
    /// Search aliases from `$search`.
    pub search: Vec<String>,
    pub source_files: Vec<EmbeddedSourceFile>,
    /// Renderable blocks left after extraction.
    pub content: Vec<Block>,
    pub children: Vec<Page>,
}

impl Page {
    /// URL of the page. Layout is decided by the renderer.
    #[must_use]
    pub fn url(&self) -> String {
        String::new()
    }

    /// Source file attached for `embed_url`, if it was found on disk.
    #[must_use]
    pub fn find_source_file(&self, embed_url: &str) -> Option<&EmbeddedSourceFile> {
        self.source_files
            .iter()
            .find(|f| f.embed_url == embed_url)
            .filter(|f| f.file_exists)
    }

    /// Depth-first, pre-order walk over this page and its descendants.
    #[must_use]
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    /// Number of pages in this subtree, including this one.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.walk().count()
    }
}

/// Iterator returned by [`Page::walk`].
pub struct Walk<'a> {
    stack: Vec<&'a Page>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Page;

    fn next(&mut self) -> Option<Self::Item> {
        let page = self.stack.pop()?;
        self.stack.extend(page.children.iter().rev());
        Some(page)
    }
}

/// A book: the page tree rooted at the start page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Book {
    /// Title of the start page.
    pub title: String,
    pub root: Page,
}
