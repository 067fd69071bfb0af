//! In-memory workspace store for folio.
//!
//! A [`FolioStore`] holds one workspace: its users, a forest of pages, and the
//! blocks on those pages. Every mutation names the acting user and is gated
//! by an [`AccessPolicy`]; a refused, missing-target or invalid command
//! returns a [`StoreError`] and leaves the store exactly as it was.
//!
//! # Components
//!
//! | Type                       | Role                                          |
//! |----------------------------|-----------------------------------------------|
//! | [`FolioStore`]             | Façade owning all state, one method per command |
//! | [`PageTree`]               | Page forest, access lists, cascading delete   |
//! | [`BlockStore`]             | Global block order, toggle nesting            |
//! | [`BlockTypeTransition`]    | Trigger menu and conversion patches           |
//! | [`AccessPolicy`]           | Edit/administer predicate ([`RolePolicy`])    |
//! | [`IdGenerator`]            | Fresh page/block ids                          |
//! | [`Command`] / [`Outcome`]  | Commands as values and their results          |
//! | [`WorkspaceSnapshot`]      | Export/import; [`SeedWorkspace`] for fixtures |
//!
//! # Example
//!
//! ```
//! use folio_store::{FolioStore, StoreConfig};
//! use folio_types::{BlockPatch, Role, User, Workspace};
//!
//! let mut store = FolioStore::new(Workspace::new("Notes"), StoreConfig::default());
//! let admin = User::new("Admin Rey", Role::Admin);
//! store.register_user(admin.clone()).unwrap();
//!
//! let page = store.add_page(&admin, None).unwrap();
//! let block = store.page_blocks(page)[0].id;
//! store
//!     .update_block(&admin, block, &BlockPatch::new().content("hello"))
//!     .unwrap();
//! assert_eq!(store.block(block).unwrap().content, "hello");
//! ```

pub mod block_store;
pub mod command;
pub mod config;
pub mod directory;
pub mod error;
pub mod identity;
pub mod page_tree;
pub mod policy;
pub mod snapshot;
pub mod store;
pub mod transition;

pub use block_store::BlockStore;
pub use command::{Command, Effect, PageRemoval};
pub use config::{StoreConfig, ToggleCascade};
pub use directory::UserDirectory;
pub use error::{InvalidReason, Outcome, OutcomeKind, Result, StoreError};
pub use identity::{IdGenerator, SequentialIds, TimeOrderedIds};
pub use page_tree::PageTree;
pub use policy::{AccessPolicy, Actor, RolePolicy};
pub use snapshot::{SeedBlock, SeedPage, SeedUser, SeedWorkspace, WorkspaceSnapshot};
pub use store::{FolioStore, Selection};
pub use transition::{BlockTypeTransition, CODE_LANGUAGES, CONVERSION_MENU, EditEffect, MenuEntry};
