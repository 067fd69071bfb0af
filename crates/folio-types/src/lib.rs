//! Shared identity, page, and block types for folio.
//!
//! This crate is the data model foundation: typed IDs, users and roles, pages,
//! blocks, and workspace metadata. It has **no internal folio dependencies**
//! and is the leaf crate the store builds on.
//!
//! # Entity-Relationship Overview
//!
//! ```text
//! Workspace (WorkspaceId) ← the single top-level container
//!     └── contains Page (PageId)
//!
//! User (UserId) ← admin or member
//!     └── creates Page (creator_id, always on the page's access list)
//!     └── edits Page when admin or listed in Page.access
//!
//! Page (PageId)
//!     └── parent_id forms a forest of pages
//!     └── owns Block (Block.page_id)
//!
//! Block (BlockId)
//!     └── parent_block_id nests it under a toggle Block
//!     └── toggle blocks list their children in insertion order
//! ```
//!
//! # Key Types
//!
//! |------------------|-------------------------------------------------|
//! | Type             | Purpose                                         |
//! |------------------|-------------------------------------------------|
//! | [`User`]         | Who is acting (id + display name + role)        |
//! | [`Page`]         | Page metadata, lineage, and access list         |
//! | [`Block`]        | Content unit with kind-specific fields          |
//! | [`BlockPatch`]   | Partial update for a block                      |
//! | [`Workspace`]    | Top-level container name                        |
//! | [`Template`]     | Built-in roadmap/calendar navigation entries    |
//! |------------------|-------------------------------------------------|

pub mod ids;
pub mod user;
pub mod page;
pub mod block;
pub mod workspace;

// Re-export primary types at crate root for convenience.
pub use ids::{BlockId, PageId, TemplateId, UserId, WorkspaceId};
pub use ids::{PrefixError, PrefixResolvable, resolve_prefix};
pub use user::{Role, User};
pub use page::{Page, page_lineage};
pub use block::{Block, BlockKind, BlockPatch, FileAttachment};
pub use workspace::{Template, TemplateKind, Workspace};

/// Current time as Unix milliseconds. Used by constructors throughout the crate.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
