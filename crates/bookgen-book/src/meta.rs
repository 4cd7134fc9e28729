//! Page metadata from `$key: value` directive blocks.
//!
//! Authors put metadata into a page as plain text paragraphs such as
//! `$id: 59` or `$search: bool, boolean`. These blocks are consumed into
//! [`Page`] fields and removed from the renderable content.

use std::collections::BTreeSet;

use bookgen_source::{Block, BlockKind, SourcePage, normalize_id};

use crate::error::BookError;
use crate::page::Page;

/// One parsed directive.
#[derive(Debug, PartialEq, Eq)]
pub struct MetaValue {
    /// Lower-cased key including the leading `$`.
    pub key: String,
    pub value: String,
}

/// Trimmed directive text if `block` is a directive block.
///
/// A directive block is a text block with exactly one unformatted inline run
/// whose trimmed text starts with `$` and is at least 4 bytes long.
fn directive_text(block: &Block) -> Option<&str> {
    if block.kind != BlockKind::Text {
        return None;
    }
    let [inline] = block.inline.as_slice() else {
        return None;
    };
    if !inline.is_plain() {
        return None;
    }
    let text = inline.text.trim();
    if text.len() < 4 || !text.starts_with('$') {
        return None;
    }
    Some(text)
}

/// True if `block` is a directive block.
#[must_use]
pub fn is_directive(block: &Block) -> bool {
    directive_text(block).is_some()
}

/// Parse the directive in `block`.
///
/// Returns `Ok(None)` for blocks that are not directives.
///
/// # Errors
///
/// Returns `BookError::MalformedDirective` if the text has no `:`.
pub fn parse_meta_value(block: &Block, page_id: &str) -> Result<Option<MetaValue>, BookError> {
    let Some(text) = directive_text(block) else {
        return Ok(None);
    };
    let Some((key, value)) = text.split_once(':') else {
        return Err(BookError::MalformedDirective {
            text: text.to_owned(),
            page_id: page_id.to_owned(),
        });
    };
    Ok(Some(MetaValue {
        key: key.trim().to_lowercase(),
        value: value.trim().to_owned(),
    }))
}

/// A directive with a recognised key.
enum Meta {
    Id(String),
    Soid(String),
    Search(Vec<String>),
    Score,
}

impl Meta {
    fn from_value(mv: MetaValue, page_id: &str) -> Result<Self, BookError> {
        match mv.key.as_str() {
            "$id" => Ok(Self::Id(mv.value)),
            "$soid" => Ok(Self::Soid(mv.value)),
            "$search" => Ok(Self::Search(
                mv.value.split(',').map(|s| s.trim().to_owned()).collect(),
            )),
            // reserved
            "$score" => Ok(Self::Score),
            _ => Err(BookError::UnknownMetaKey {
                key: mv.key,
                page_id: page_id.to_owned(),
            }),
        }
    }
}

/// Move directives from `source` into `page` metadata.
///
/// Directive blocks are removed from `source`; the remaining blocks keep
/// their order.
///
/// # Errors
///
/// Returns an error on a malformed directive or an unknown key. Neither
/// `page` nor `source` is modified in that case.
pub fn extract_meta(page: &mut Page, source: &mut SourcePage) -> Result<(), BookError> {
    let page_id = normalize_id(&source.id);
    let mut metas = Vec::new();
    let mut to_remove = BTreeSet::new();

    for (idx, block) in source.content.iter().enumerate() {
        if let Some(mv) = parse_meta_value(block, &page_id)? {
            to_remove.insert(idx);
            metas.push(Meta::from_value(mv, &page_id)?);
        }
    }

    for meta in metas {
        match meta {
            Meta::Id(id) => page.id = Some(id),
            Meta::Soid(soid) => page.stack_overflow_id = Some(soid),
            Meta::Search(terms) => page.search = terms,
            Meta::Score => {}
        }
    }

    source.remove_blocks(&to_remove);
    Ok(())
}
