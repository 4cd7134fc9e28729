//! Page-tree snapshot model and source file access for bookgen.
//!
//! This crate provides the collaborators the book builder reads from:
//!
//! - [`SourceTree`]: every [`SourcePage`] of an export, keyed by normalized id
//! - [`Block`] and friends: the typed content blocks of a page
//! - [`normalize_id`]: canonical form used as [`SourceTree`] keys
//! - [`SourceReader`]: reads and filters source files referenced by embeds
//! - [`MockSourceReader`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use bookgen_source::SourceTree;
//!
//! let tree = SourceTree::load_dir("notion_cache".as_ref())?;
//! let page = tree.get("0e6b3e3d-4a4c-4c06-bf2b-0dbd6b5d2a9a").unwrap();
//! println!("{}: {} blocks", page.title, page.content.len());
//! ```

mod block;
mod id;
#[cfg(feature = "mock")]
mod mock;
mod reader;
mod tree;

pub use block::{Block, BlockKind, EmbedFormat, InlineFormat, InlineRun, SourcePage, remove_blocks};
pub use id::normalize_id;
#[cfg(feature = "mock")]
pub use mock::MockSourceReader;
pub use reader::{FsSourceReader, ReadError, SourceReader, filter_source_lines};
pub use tree::{SourceError, SourceTree};
