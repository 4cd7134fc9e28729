//! Nested pages from page-link blocks.

use std::collections::BTreeSet;

use bookgen_source::{BlockKind, SourcePage, SourceTree, normalize_id};

use crate::error::BookError;

/// Resolve the page-link blocks of `source` and remove them.
///
/// Returns the linked pages in block order.
///
/// # Errors
///
/// Returns `BookError::MissingSubPage` if a link points at a page that is
/// not in `tree`. `source` is left untouched in that case.
pub fn extract_sub_pages<'t>(
    source: &mut SourcePage,
    tree: &'t SourceTree,
) -> Result<Vec<&'t SourcePage>, BookError> {
    let mut sub_pages = Vec::new();
    let mut to_remove = BTreeSet::new();

    for (idx, block) in source.content.iter().enumerate() {
        if block.kind != BlockKind::Page {
            continue;
        }
        let id = normalize_id(&block.id);
        let sub_page = tree.get(&id).ok_or(BookError::MissingSubPage { id })?;
        to_remove.insert(idx);
        sub_pages.push(sub_page);
    }

    source.remove_blocks(&to_remove);
    Ok(sub_pages)
}
