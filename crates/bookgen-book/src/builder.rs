//! Book tree construction.
//!
//! [`BookBuilder`] walks the page tree depth-first from the start page. Each
//! source page is copied, stripped of its directive and page-link blocks and
//! turned into a [`Page`]:
//!
//! 1. title
//! 2. metadata ([`extract_meta`])
//! 3. embedded source files ([`EmbedResolver::attach_source_files`])
//! 4. sub-pages ([`extract_sub_pages`]), built recursively in block order
//!
//! The three passes look at disjoint block types (text, embed, page), so no
//! block is consumed twice.

use std::collections::HashSet;
use std::time::Instant;

use bookgen_source::{BlockKind, SourcePage, SourceTree, normalize_id};

use crate::embed::EmbedResolver;
use crate::error::BookError;
use crate::meta::extract_meta;
use crate::page::{Book, Page};
use crate::subpages::extract_sub_pages;

/// Builds [`Book`]s from a [`SourceTree`].
///
/// The tree is only read; one builder can build several books.
pub struct BookBuilder<'a> {
    tree: &'a SourceTree,
    resolver: &'a EmbedResolver,
}

impl<'a> BookBuilder<'a> {
    #[must_use]
    pub fn new(tree: &'a SourceTree, resolver: &'a EmbedResolver) -> Self {
        Self { tree, resolver }
    }

    /// Build the book rooted at `start_page_id`.
    ///
    /// # Errors
    ///
    /// Returns `BookError::MissingStartPage` if the start page is not in the
    /// tree, `BookError::UnexpectedRootType` if it is not a page, and any
    /// error from building the page tree.
    pub fn build(&self, start_page_id: &str) -> Result<Book, BookError> {
        let start = Instant::now();
        let id = normalize_id(start_page_id);
        let source = self
            .tree
            .get(&id)
            .ok_or_else(|| BookError::MissingStartPage { id: id.clone() })?;
        if source.kind != BlockKind::Page {
            return Err(BookError::UnexpectedRootType { found: source.kind });
        }

        let root = self.build_page(source)?;
        let missing_files = root
            .walk()
            .flat_map(|p| &p.source_files)
            .filter(|f| !f.file_exists)
            .count();
        tracing::info!(
            title = %root.title,
            page_count = root.page_count(),
            missing_files,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Book built"
        );

        Ok(Book {
            title: root.title.clone(),
            root,
        })
    }

    /// Build the subtree rooted at `source`.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error found anywhere in the subtree.
    pub fn build_page(&self, source: &SourcePage) -> Result<Page, BookError> {
        let mut ancestors = HashSet::new();
        self.build_subtree(source, None, &mut ancestors)
    }

    fn build_subtree(
        &self,
        source: &SourcePage,
        parent_id: Option<&str>,
        ancestors: &mut HashSet<String>,
    ) -> Result<Page, BookError> {
        let notion_id = normalize_id(&source.id);
        if !ancestors.insert(notion_id.clone()) {
            return Err(BookError::PageCycle { id: notion_id });
        }

        let mut source = source.clone();
        let mut page = Page {
            title: source.title.clone(),
            notion_id,
            parent_id: parent_id.map(str::to_owned),
            ..Default::default()
        };

        extract_meta(&mut page, &mut source)?;
        self.resolver.attach_source_files(&mut page, &source);
        let sub_pages = extract_sub_pages(&mut source, self.tree)?;
        page.content = source.content;

        tracing::debug!(
            id = %page.notion_id,
            title = %page.title,
            sub_pages = sub_pages.len(),
            source_files = page.source_files.len(),
            "Page extracted"
        );

        let mut children = Vec::with_capacity(sub_pages.len());
        for sub_page in sub_pages {
            let child = self.build_subtree(sub_page, Some(page.notion_id.as_str()), ancestors)?;
            children.push(child);
        }
        page.children = children;

        ancestors.remove(&page.notion_id);
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bookgen_source::{Block, FsSourceReader, MockSourceReader};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::meta::is_directive;

    const BOOLEANS_URL: &str = "https://onlinetool.io/gitoembed/widget?url=https%3A%2F%2Fgithub.com%2Fessentialbooks%2Fbooks%2Fblob%2Fmaster%2Fbooks%2Fgo%2F0020-basic-types%2Fbooleans.go";

    fn resolver() -> EmbedResolver {
        let reader = MockSourceReader::new().with_file(
            "/repo/books/go/0020-basic-types/booleans.go",
            "package main\n\nvar b = true\n",
        );
        EmbedResolver::new(Arc::new(reader), "/repo")
    }

    /// Root with 2 directives, 1 embed and 2 sub-pages; depth 3.
    fn book_tree() -> SourceTree {
        SourceTree::from_pages([
            SourcePage::new(
                "0000-root",
                "Essential Go",
                vec![
                    Block::text("m1", "$id: 1"),
                    Block::text("t1", "Welcome."),
                    Block::text("m2", "$search: go, golang"),
                    Block::embed("e1", BOOLEANS_URL),
                    Block::page_link("1111-basics"),
                    Block::text("t2", "More below."),
                    Block::page_link("2222-maps"),
                ],
            ),
            SourcePage::new(
                "1111-basics",
                "Basic types",
                vec![
                    Block::text("m1", "$soid: 42"),
                    Block::page_link("3333-bools"),
                ],
            ),
            SourcePage::new("2222-maps", "Maps", vec![Block::text("t1", "Maps.")]),
            SourcePage::new(
                "3333-bools",
                "Booleans",
                vec![Block::embed("e1", "https://www.youtube.com/embed/x")],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_build_book() {
        let tree = book_tree();
        let resolver = resolver();

        let book = BookBuilder::new(&tree, &resolver).build("0000ROOT").unwrap();

        assert_eq!(book.title, "Essential Go");
        let root = &book.root;
        assert_eq!(root.notion_id, "0000root");
        assert_eq!(root.parent_id, None);
        assert_eq!(root.id.as_deref(), Some("1"));
        assert_eq!(root.search, vec!["go", "golang"]);
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.source_files.len(), 1);
        assert!(root.source_files[0].file_exists);
        assert_eq!(root.source_files[0].lines, vec!["package main", "", "var b = true"]);

        let content: Vec<_> = root.content.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(content, vec!["t1", "e1", "t2"]);
        assert!(
            root.content
                .iter()
                .all(|b| !is_directive(b) && b.kind != BlockKind::Page)
        );
    }

    #[test]
    fn test_build_book_children_and_depth() {
        let tree = book_tree();
        let resolver = resolver();

        let book = BookBuilder::new(&tree, &resolver).build("0000-root").unwrap();

        let titles: Vec<_> = book.root.walk().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Essential Go", "Basic types", "Booleans", "Maps"]);

        let basics = &book.root.children[0];
        assert_eq!(basics.parent_id.as_deref(), Some("0000root"));
        assert_eq!(basics.stack_overflow_id.as_deref(), Some("42"));
        assert!(basics.content.is_empty());

        let bools = &basics.children[0];
        assert_eq!(bools.parent_id.as_deref(), Some("1111basics"));
        assert_eq!(bools.source_files.len(), 1);
        assert!(!bools.source_files[0].file_exists);
        assert!(bools.children.is_empty());
    }

    #[test]
    fn test_build_does_not_modify_tree() {
        let tree = book_tree();
        let resolver = resolver();

        BookBuilder::new(&tree, &resolver).build("0000-root").unwrap();

        assert_eq!(tree.get("0000-root").unwrap().content.len(), 7);
    }

    #[test]
    fn test_missing_start_page() {
        let tree = book_tree();
        let resolver = resolver();

        let err = BookBuilder::new(&tree, &resolver).build("9999").unwrap_err();

        assert!(matches!(err, BookError::MissingStartPage { id } if id == "9999"));
    }

    #[test]
    fn test_root_must_be_page() {
        let mut root = SourcePage::new("aaaa", "Not a page", vec![]);
        root.kind = BlockKind::Text;
        let tree = SourceTree::from_pages([root]).unwrap();
        let resolver = resolver();

        let err = BookBuilder::new(&tree, &resolver).build("aaaa").unwrap_err();

        assert!(matches!(err, BookError::UnexpectedRootType { found: BlockKind::Text }));
        assert_eq!(
            err.to_string(),
            "start block is of type 'text' and not 'page'"
        );
    }

    #[test]
    fn test_missing_sub_page_aborts() {
        let tree = SourceTree::from_pages([SourcePage::new(
            "aaaa",
            "Root",
            vec![Block::page_link("bbbb")],
        )])
        .unwrap();
        let resolver = resolver();

        let err = BookBuilder::new(&tree, &resolver).build("aaaa").unwrap_err();

        assert!(matches!(err, BookError::MissingSubPage { id } if id == "bbbb"));
    }

    #[test]
    fn test_unknown_directive_in_child_aborts() {
        let tree = SourceTree::from_pages([
            SourcePage::new("aaaa", "Root", vec![Block::page_link("bbbb")]),
            SourcePage::new("bbbb", "Child", vec![Block::text("m", "$bogus: x")]),
        ])
        .unwrap();
        let resolver = resolver();

        let err = BookBuilder::new(&tree, &resolver).build("aaaa").unwrap_err();

        let message = err.to_string();
        assert!(message.contains("bogus"), "{message}");
        assert!(message.contains("bbbb"), "{message}");
    }

    #[test]
    fn test_cycle_is_fatal() {
        let tree = SourceTree::from_pages([
            SourcePage::new("aaaa", "Root", vec![Block::page_link("bbbb")]),
            SourcePage::new("bbbb", "Child", vec![Block::page_link("AAAA")]),
        ])
        .unwrap();
        let resolver = resolver();

        let err = BookBuilder::new(&tree, &resolver).build("aaaa").unwrap_err();

        assert!(matches!(err, BookError::PageCycle { id } if id == "aaaa"));
    }

    #[test]
    fn test_shared_page_is_not_a_cycle() {
        let tree = SourceTree::from_pages([
            SourcePage::new(
                "aaaa",
                "Root",
                vec![Block::page_link("bbbb"), Block::page_link("cccc")],
            ),
            SourcePage::new("bbbb", "B", vec![Block::page_link("dddd")]),
            SourcePage::new("cccc", "C", vec![Block::page_link("dddd")]),
            SourcePage::new("dddd", "Shared", vec![]),
        ])
        .unwrap();
        let resolver = resolver();

        let book = BookBuilder::new(&tree, &resolver).build("aaaa").unwrap();

        assert_eq!(book.root.page_count(), 5);
    }

    #[test]
    fn test_build_reads_sources_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("books/go/0020-basic-types/booleans.go");
        std::fs::create_dir_all(file.parent().unwrap()).unwrap();
        std::fs::write(&file, "package main\n\n// :show start\nvar b = true\n\n").unwrap();
        let resolver = EmbedResolver::new(Arc::new(FsSourceReader::new()), dir.path());
        let tree = book_tree();

        let book = BookBuilder::new(&tree, &resolver).build("0000-root").unwrap();

        let embedded = &book.root.source_files[0];
        assert!(embedded.file_exists);
        assert_eq!(embedded.path, file);
        assert_eq!(embedded.file_name, "booleans.go");
        assert_eq!(embedded.lines, vec!["package main", "", "var b = true"]);
    }

    #[test]
    fn test_book_serializes_to_json() {
        let tree = book_tree();
        let resolver = resolver();

        let book = BookBuilder::new(&tree, &resolver).build("0000-root").unwrap();
        let json = serde_json::to_value(&book).unwrap();

        assert_eq!(json["title"], "Essential Go");
        let root = &json["root"];
        assert_eq!(root["notion_id"], "0000root");
        assert_eq!(root["parent_id"], serde_json::Value::Null);
        assert_eq!(root["search"], serde_json::json!(["go", "golang"]));
        assert_eq!(root["source_files"][0]["file_exists"], true);
        assert!(root["source_files"][0].get("error").is_none());
        assert_eq!(root["children"][0]["title"], "Basic types");
        assert_eq!(root["children"][0]["parent_id"], "0000root");

        let unresolved = &root["children"][0]["children"][0]["source_files"][0];
        assert_eq!(unresolved["file_exists"], false);
        assert!(unresolved["error"].is_string());
    }
}
