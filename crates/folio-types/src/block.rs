//! Block types.
//!
//! A block is the atomic content unit of a page. Every block belongs to exactly
//! one page (`page_id`). Blocks may nest under a toggle block through
//! `parent_block_id`; the toggle mirrors that relation in its ordered
//! `children` list.
//!
//! ## Field groups
//!
//! - **Core**: id, page_id, parent_block_id, kind, content
//! - **Todo**: checked
//! - **Image**: src
//! - **Code**: language
//! - **Toggle**: is_expanded, children
//! - **File**: file
//!
//! Kind-specific fields are `Option`s and survive a change of kind, the same
//! way a partial update leaves untouched fields alone.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::EnumString;

use crate::ids::{BlockId, PageId};

/// What a block *is*.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum BlockKind {
    /// Plain paragraph.
    #[default]
    Text,
    /// Large heading text.
    Heading,
    /// Checkbox with text.
    #[strum(serialize = "todo", serialize = "to-do")]
    Todo,
    /// Image; `src` holds the data URL or link.
    Image,
    /// Collapsible container of child blocks.
    Toggle,
    /// Horizontal rule; content is always empty.
    Divider,
    /// Code listing with a `language`.
    Code,
    /// Uploaded file described by `file`.
    File,
}

impl BlockKind {
    /// Every kind, in declaration order.
    pub const ALL: [BlockKind; 8] = [
        BlockKind::Text,
        BlockKind::Heading,
        BlockKind::Todo,
        BlockKind::Image,
        BlockKind::Toggle,
        BlockKind::Divider,
        BlockKind::Code,
        BlockKind::File,
    ];

    /// Parse from string (case-insensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Text => "text",
            BlockKind::Heading => "heading",
            BlockKind::Todo => "todo",
            BlockKind::Image => "image",
            BlockKind::Toggle => "toggle",
            BlockKind::Divider => "divider",
            BlockKind::Code => "code",
            BlockKind::File => "file",
        }
    }

    /// Whether blocks of this kind can own child blocks.
    pub fn is_container(&self) -> bool {
        matches!(self, BlockKind::Toggle)
    }

    /// Whether this kind carries no text of its own.
    pub fn is_textless(&self) -> bool {
        matches!(self, BlockKind::Divider | BlockKind::File)
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Metadata of a file attached to a `File` block.
///
/// Reading the bytes is the platform's job; the store only records what the
/// upload reported.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAttachment {
    pub name: String,
    pub url: String,
    /// Size in bytes.
    pub size: u64,
    /// MIME type as reported by the platform, e.g. "application/pdf".
    pub mime: String,
}

/// A content block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    /// Owning page. Access checks are keyed by this, never by the block.
    pub page_id: PageId,
    /// Containing toggle block, if nested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_block_id: Option<BlockId>,
    pub kind: BlockKind,
    /// Text payload; meaning depends on `kind`.
    #[serde(default)]
    pub content: String,

    // Kind-specific fields

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_expanded: Option<bool>,
    /// Child block IDs in insertion order (toggle blocks).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<BlockId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileAttachment>,
}

impl Block {
    /// Create an empty text block on `page_id`.
    pub fn empty(id: BlockId, page_id: PageId) -> Self {
        Self {
            id,
            page_id,
            parent_block_id: None,
            kind: BlockKind::Text,
            content: String::new(),
            checked: None,
            src: None,
            language: None,
            is_expanded: None,
            children: None,
            file: None,
        }
    }

    /// Create a block of `kind` with `content`.
    pub fn new(id: BlockId, page_id: PageId, kind: BlockKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            ..Self::empty(id, page_id)
        }
    }

    /// Nest this block under `parent`.
    pub fn under(mut self, parent: BlockId) -> Self {
        self.parent_block_id = Some(parent);
        self
    }

    /// Check if this is a root block of its page (not nested).
    pub fn is_root(&self) -> bool {
        self.parent_block_id.is_none()
    }

    /// Child IDs, empty when the block has no children list.
    pub fn child_ids(&self) -> &[BlockId] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Apply a partial update: every present field overwrites, absent fields stay.
    pub fn apply(&mut self, patch: &BlockPatch) {
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
        if let Some(checked) = patch.checked {
            self.checked = Some(checked);
        }
        if let Some(src) = &patch.src {
            self.src = Some(src.clone());
        }
        if let Some(language) = &patch.language {
            self.language = Some(language.clone());
        }
        if let Some(expanded) = patch.is_expanded {
            self.is_expanded = Some(expanded);
        }
        if let Some(children) = &patch.children {
            self.children = Some(children.clone());
        }
        if let Some(file) = &patch.file {
            self.file = Some(file.clone());
        }
    }
}

/// A partial update for a block (shallow merge).
///
/// Identity and placement (`id`, `page_id`, `parent_block_id`) are not
/// patchable. `children` can only be reset to empty, via `reset_children`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<BlockKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_expanded: Option<bool>,
    #[serde(skip)]
    pub(crate) children: Option<Vec<BlockId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<FileAttachment>,
}

impl BlockPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn kind(mut self, kind: BlockKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = Some(checked);
        self
    }

    pub fn src(mut self, src: impl Into<String>) -> Self {
        self.src = Some(src.into());
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn expanded(mut self, expanded: bool) -> Self {
        self.is_expanded = Some(expanded);
        self
    }

    pub fn file(mut self, file: FileAttachment) -> Self {
        self.file = Some(file);
        self
    }

    /// Reset the children list to empty (toggle initialization).
    pub fn reset_children(mut self) -> Self {
        self.children = Some(Vec::new());
        self
    }

    /// Whether the patch resets the children list.
    pub fn resets_children(&self) -> bool {
        self.children.is_some()
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ============================================================================
// Tests
// ============================================================================
