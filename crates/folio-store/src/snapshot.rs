//! Snapshots and label-keyed seed files.
//!
//! A [`WorkspaceSnapshot`] is the complete state of a store as plain data,
//! for export and re-import (JSON or RON). A [`SeedWorkspace`] is the
//! hand-written form: entities are named by short labels (`"page-2"`) and
//! turned into ids with the UUIDv5 label derivation, so the same seed always
//! yields the same ids.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use folio_types::{
    Block, BlockId, BlockKind, Page, PageId, Role, User, UserId, Workspace, WorkspaceId,
};

use crate::block_store::BlockStore;
use crate::config::StoreConfig;
use crate::directory::UserDirectory;
use crate::error::{InvalidReason, Result, StoreError};
use crate::page_tree::PageTree;
use crate::store::{FolioStore, Selection};

/// Complete store state as plain data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceSnapshot {
    pub workspace: Workspace,
    pub users: Vec<User>,
    pub pages: Vec<Page>,
    /// Global storage order.
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub selection: Selection,
}

impl WorkspaceSnapshot {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| StoreError::Snapshot(e.to_string()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| StoreError::Snapshot(e.to_string()))
    }

    pub fn to_ron(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| StoreError::Snapshot(e.to_string()))
    }

    pub fn from_ron(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| StoreError::Snapshot(e.to_string()))
    }
}

impl FolioStore {
    /// Copy out the full state.
    pub fn snapshot(&self) -> WorkspaceSnapshot {
        WorkspaceSnapshot {
            workspace: self.workspace.clone(),
            users: self.users.iter().cloned().collect(),
            pages: self.pages.iter().cloned().collect(),
            blocks: self.blocks.iter().cloned().collect(),
            selection: self.selection,
        }
    }

    /// Rebuild a store from a snapshot, validating it first.
    ///
    /// Duplicate ids, unknown parents, cycles, a creator missing from its
    /// page's access list, access entries naming unknown users, and blocks on
    /// missing pages are all rejected. A selection that points nowhere is
    /// cleared.
    pub fn from_snapshot(snapshot: WorkspaceSnapshot, config: StoreConfig) -> Result<Self> {
        let users = UserDirectory::from_users(snapshot.users)?;
        for page in &snapshot.pages {
            if let Some(unknown) = page.access.iter().find(|u| !users.contains(**u)) {
                return Err(InvalidReason::UnknownUser(*unknown).into());
            }
        }
        let pages = PageTree::from_pages(snapshot.pages)?;
        let blocks = BlockStore::from_blocks(snapshot.blocks, &pages)?;

        let mut store = FolioStore::new(snapshot.workspace, config);
        store.users = users;
        store.pages = pages;
        store.blocks = blocks;
        store.selection = match snapshot.selection {
            Selection::Page(id) if !store.pages.contains(id) => {
                warn!(page = %id, "snapshot selects a missing page, clearing");
                Selection::None
            }
            Selection::Template(id) if store.template(id).is_none() => {
                warn!(template = %id, "snapshot selects an unknown template, clearing");
                Selection::None
            }
            other => other,
        };
        Ok(store)
    }
}

// ============================================================================
// Seed files
// ============================================================================

/// A workspace written by hand, with labels instead of ids.
///
/// ```ron
/// (
///     name: "Kelas REY",
///     users: [(label: "user-1", name: "Admin Rey", role: admin)],
///     pages: [(label: "page-1", title: "Welcome Page", creator: "user-1")],
///     blocks: [(label: "block-1", page: "page-1", kind: heading, content: "Hi")],
///     selected: Some("page-1"),
/// )
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SeedWorkspace {
    pub name: String,
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub pages: Vec<SeedPage>,
    #[serde(default)]
    pub blocks: Vec<SeedBlock>,
    #[serde(default)]
    pub selected: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SeedUser {
    pub label: String,
    pub name: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SeedPage {
    pub label: String,
    pub title: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub parent: Option<String>,
    pub creator: String,
    /// User labels. Empty means just the creator.
    #[serde(default)]
    pub access: Vec<String>,
    /// Unix millis; defaults to now.
    #[serde(default)]
    pub created_at: Option<u64>,
    #[serde(default)]
    pub expanded: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SeedBlock {
    pub label: String,
    pub page: String,
    /// Label of the containing toggle block.
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub kind: BlockKind,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub checked: Option<bool>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub src: Option<String>,
}

impl SeedWorkspace {
    pub fn from_ron(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| StoreError::Snapshot(format!("seed: {e}")))
    }

    /// Resolve labels to ids. Every label a page or block refers to must be
    /// declared in the same seed.
    pub fn into_snapshot(self) -> Result<WorkspaceSnapshot> {
        let user_ids: HashMap<&str, UserId> = self
            .users
            .iter()
            .map(|u| (u.label.as_str(), UserId::from_label(&u.label)))
            .collect();
        let page_ids: HashMap<&str, PageId> = self
            .pages
            .iter()
            .map(|p| (p.label.as_str(), PageId::from_label(&p.label)))
            .collect();
        let block_ids: HashMap<&str, BlockId> = self
            .blocks
            .iter()
            .map(|b| (b.label.as_str(), BlockId::from_label(&b.label)))
            .collect();

        let users = self
            .users
            .iter()
            .map(|u| User::with_id(UserId::from_label(&u.label), u.name.clone(), u.role))
            .collect();

        let mut pages = Vec::with_capacity(self.pages.len());
        for seed in &self.pages {
            let creator = resolve(&user_ids, &seed.creator)?;
            let parent = seed
                .parent
                .as_deref()
                .map(|label| resolve(&page_ids, label))
                .transpose()?;
            let id = PageId::from_label(&seed.label);
            let mut page = Page::new(id, seed.title.clone(), parent, creator);
            page.icon = seed.icon.clone();
            page.is_expanded = seed.expanded;
            if let Some(at) = seed.created_at {
                page.created_at = at;
            }
            if !seed.access.is_empty() {
                page.access = seed
                    .access
                    .iter()
                    .map(|label| resolve(&user_ids, label))
                    .collect::<Result<_>>()?;
            }
            pages.push(page);
        }

        let mut blocks: Vec<Block> = Vec::with_capacity(self.blocks.len());
        for seed in &self.blocks {
            let id = BlockId::from_label(&seed.label);
            let page = resolve(&page_ids, &seed.page)?;
            let mut block = Block::new(id, page, seed.kind, seed.content.clone());
            block.checked = seed.checked;
            block.language = seed.language.clone();
            block.src = seed.src.clone();
            if seed.kind == BlockKind::Toggle {
                block.is_expanded = Some(false);
                block.children = Some(Vec::new());
            }
            if let Some(label) = &seed.parent {
                block.parent_block_id = Some(resolve(&block_ids, label)?);
            }
            blocks.push(block);
        }

        // Children lists follow declaration order, wherever the toggle sits.
        let links: Vec<(BlockId, BlockId)> = blocks
            .iter()
            .filter_map(|b| b.parent_block_id.map(|parent| (parent, b.id)))
            .collect();
        for (parent, child) in links {
            if let Some(toggle) = blocks.iter_mut().find(|b| b.id == parent) {
                toggle.children.get_or_insert_with(Vec::new).push(child);
            }
        }

        let selection = match self.selected.as_deref() {
            Some(label) => Selection::Page(resolve(&page_ids, label)?),
            None => Selection::None,
        };

        Ok(WorkspaceSnapshot {
            workspace: Workspace {
                id: WorkspaceId::from_label(&self.name),
                name: self.name,
            },
            users,
            pages,
            blocks,
            selection,
        })
    }
}

fn resolve<T: Copy>(ids: &HashMap<&str, T>, label: &str) -> Result<T> {
    ids.get(label)
        .copied()
        .ok_or_else(|| InvalidReason::UnknownLabel(label.to_string()).into())
}
