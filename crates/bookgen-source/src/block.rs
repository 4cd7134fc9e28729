//! Content blocks of a source page.
//!
//! A [`SourcePage`] is one node of the exported page tree: a title, a block
//! type and an ordered list of [`Block`]s. Blocks are either renderable
//! content (text, headers, code, embeds) or structural markers such as
//! links to nested pages.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Block type tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// A page, or a link to a nested page when it appears in page content.
    Page,
    /// Paragraph of inline text.
    Text,
    /// Embedded external preview (source files are embedded this way).
    Embed,
    Header,
    SubHeader,
    SubSubHeader,
    Code,
    BulletedList,
    NumberedList,
    Quote,
    Image,
    Divider,
    /// Any block type the snapshot format does not model.
    #[serde(other)]
    Other,
}

impl BlockKind {
    /// Tag as it appears in snapshot files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Text => "text",
            Self::Embed => "embed",
            Self::Header => "header",
            Self::SubHeader => "sub_header",
            Self::SubSubHeader => "sub_sub_header",
            Self::Code => "code",
            Self::BulletedList => "bulleted_list",
            Self::NumberedList => "numbered_list",
            Self::Quote => "quote",
            Self::Image => "image",
            Self::Divider => "divider",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Formatting applied to an inline run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InlineFormat {
    Bold,
    Italic,
    Strikethrough,
    Code,
    Link { href: String },
}

/// A run of text sharing the same formatting.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineRun {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub formats: Vec<InlineFormat>,
}

impl InlineRun {
    /// Create an unformatted run.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            formats: Vec::new(),
        }
    }

    /// True if the run carries no formatting and no link.
    #[must_use]
    pub fn is_plain(&self) -> bool {
        self.formats.is_empty()
    }
}

/// Format of an embed block.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedFormat {
    /// URL shown inside the embed frame.
    pub display_source: String,
}

/// A single content block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Block id. For page links this is the id of the linked page.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inline: Vec<InlineRun>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed: Option<EmbedFormat>,
}

impl Block {
    /// Text block with a single plain run.
    #[must_use]
    pub fn text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: BlockKind::Text,
            inline: vec![InlineRun::plain(text)],
            embed: None,
        }
    }

    /// Link to the page with the given id.
    #[must_use]
    pub fn page_link(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: BlockKind::Page,
            inline: Vec::new(),
            embed: None,
        }
    }

    /// Embed block showing `display_source`.
    #[must_use]
    pub fn embed(id: impl Into<String>, display_source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: BlockKind::Embed,
            inline: Vec::new(),
            embed: Some(EmbedFormat {
                display_source: display_source.into(),
            }),
        }
    }

    /// Display source of an embed block (empty string when missing).
    #[must_use]
    pub fn display_source(&self) -> &str {
        self.embed.as_ref().map_or("", |e| e.display_source.as_str())
    }
}

/// One node of the exported page tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePage {
    pub id: String,
    #[serde(rename = "type", default = "default_page_kind")]
    pub kind: BlockKind,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: Vec<Block>,
    /// Ids of `content`, index for index.
    #[serde(default)]
    pub content_ids: Vec<String>,
}

fn default_page_kind() -> BlockKind {
    BlockKind::Page
}

impl SourcePage {
    /// Create a page node; `content_ids` is derived from the blocks.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>, content: Vec<Block>) -> Self {
        let content_ids = content.iter().map(|b| b.id.clone()).collect();
        Self {
            id: id.into(),
            kind: BlockKind::Page,
            title: title.into(),
            content,
            content_ids,
        }
    }

    /// Drop the blocks at the given indexes from `content` and `content_ids`.
    pub fn remove_blocks(&mut self, to_remove: &BTreeSet<usize>) {
        if to_remove.is_empty() {
            return;
        }
        self.content = remove_blocks(&self.content, to_remove);
        self.content_ids = remove_blocks(&self.content_ids, to_remove);
    }
}

/// Copy `items` without the elements at the indexes in `to_remove`.
///
/// Survivors keep their relative order.
#[must_use]
pub fn remove_blocks<T: Clone>(items: &[T], to_remove: &BTreeSet<usize>) -> Vec<T> {
    items
        .iter()
        .enumerate()
        .filter(|(idx, _)| !to_remove.contains(idx))
        .map(|(_, item)| item.clone())
        .collect()
}
