//! Book extraction from an exported page tree.
//!
//! Turns the [`SourceTree`](bookgen_source::SourceTree) of a documentation
//! export into a [`Book`]: a tree of [`Page`]s with metadata, attached source
//! files and renderable content.
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use bookgen_book::{BookBuilder, EmbedResolver};
//! use bookgen_source::{FsSourceReader, SourceTree};
//!
//! let tree = SourceTree::load_dir("notion_cache".as_ref())?;
//! let resolver = EmbedResolver::new(Arc::new(FsSourceReader::new()), std::env::current_dir()?);
//! let book = BookBuilder::new(&tree, &resolver).build("fb5f6c9d-0f3c-4c3e-b5e3-1a1d1f6a7c2e")?;
//!
//! for page in book.root.walk() {
//!     println!("{} ({} source files)", page.title, page.source_files.len());
//! }
//! # Ok(())
//! # }
//! ```

mod builder;
mod embed;
mod error;
mod meta;
mod page;
mod subpages;

pub use builder::BookBuilder;
pub use embed::{EmbedConvention, EmbedResolver};
pub use error::BookError;
pub use meta::{MetaValue, extract_meta, is_directive, parse_meta_value};
pub use page::{Book, EmbeddedSourceFile, Page, Walk};
pub use subpages::extract_sub_pages;
