//! Fatal book building errors.
//!
//! Every variant means the exported content is inconsistent and needs a human
//! to fix it. Recoverable problems (unresolvable embeds, unreadable source
//! files) are recorded on [`EmbeddedSourceFile`](crate::EmbeddedSourceFile)
//! instead.

use bookgen_source::BlockKind;

/// Error building a book from a page tree.
#[derive(Debug, thiserror::Error)]
pub enum BookError {
    /// A `$key: value` directive with a key nobody handles.
    #[error("unknown key '{key}' in page with id {page_id}")]
    UnknownMetaKey { key: String, page_id: String },

    /// A directive line without the `:` separator.
    #[error("malformed directive '{text}' in page with id {page_id}: missing ':'")]
    MalformedDirective { text: String, page_id: String },

    /// A page link points at a page missing from the tree.
    #[error("no sub page for id {id}")]
    MissingSubPage { id: String },

    /// The configured start page is not in the tree.
    #[error("start page {id} not found")]
    MissingStartPage { id: String },

    /// The start node is not a page.
    #[error("start block is of type '{found}' and not '{expected}'", expected = BlockKind::Page)]
    UnexpectedRootType { found: BlockKind },

    /// A page links back to one of its ancestors.
    #[error("page {id} is its own ancestor")]
    PageCycle { id: String },
}
