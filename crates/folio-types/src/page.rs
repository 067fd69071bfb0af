//! Page types.
//!
//! A `Page` is a titled node in the workspace hierarchy. `parent_id` forms a
//! forest; the page owns its blocks (by `Block::page_id`) and carries the
//! access list that gates every mutation of it or its blocks.

use serde::{Deserialize, Serialize};

use crate::ids::{PageId, UserId};

/// A node in the page forest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    /// Human-facing title. Never blank once set through the store.
    pub title: String,
    /// Emoji or short glyph shown beside the title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Parent page. None for root pages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<PageId>,
    /// Who created this page. Always present in `access`.
    pub creator_id: UserId,
    /// Users allowed to mutate this page, in grant order.
    pub access: Vec<UserId>,
    /// When this page was created (Unix millis).
    pub created_at: u64,
    /// Navigation-only UI state; not a content mutation.
    #[serde(default)]
    pub is_expanded: bool,
}

impl Page {
    /// Create a page owned by `creator`, whose access list is just the creator.
    pub fn new(
        id: PageId,
        title: impl Into<String>,
        parent_id: Option<PageId>,
        creator_id: UserId,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            icon: None,
            parent_id,
            creator_id,
            access: vec![creator_id],
            created_at: crate::now_millis(),
            is_expanded: false,
        }
    }

    /// Whether this is a root page (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Whether `user` is on this page's access list.
    pub fn grants(&self, user: UserId) -> bool {
        self.access.contains(&user)
    }

    /// Display string: icon and title.
    pub fn display_name(&self) -> String {
        match self.icon.as_deref() {
            Some(icon) if !icon.is_empty() => format!("{icon} {}", self.title),
            _ => self.title.clone(),
        }
    }
}

/// Walk a parent chain from `start` up to the root (inclusive).
///
/// Stops at a missing parent or on a repeated ID, so corrupt data cannot
/// loop forever.
pub fn page_lineage<'a>(
    pages: impl Fn(PageId) -> Option<&'a Page>,
    start: PageId,
) -> Vec<&'a Page> {
    let mut chain = Vec::new();
    let mut seen = std::collections::HashSet::new();
    let mut current = Some(start);
    while let Some(id) = current {
        if !seen.insert(id) {
            break; // cycle detected
        }
        match pages(id) {
            Some(page) => {
                chain.push(page);
                current = page.parent_id;
            }
            None => break,
        }
    }
    chain
}

// ============================================================================
// Tests
// ============================================================================
