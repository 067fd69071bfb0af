//! Block storage with toggle nesting.
//!
//! All blocks of all pages share one `IndexMap`, and its iteration order is
//! the global storage order. Inserting "after" a block splices the new block
//! in directly behind it; everything else appends.
//!
//! Nesting is recorded twice: the child's `parent_block_id` and the toggle's
//! ordered `children` list. Insert and delete keep both sides in step.
//!
//! Blocks carry no access list of their own. Every gate resolves the owning
//! page through the [`PageTree`] and asks the [`Actor`] about that page.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::{debug, info};

use folio_types::{Block, BlockId, BlockKind, BlockPatch, PageId};

use crate::config::ToggleCascade;
use crate::error::{InvalidReason, Result, StoreError};
use crate::page_tree::PageTree;
use crate::policy::Actor;

/// All blocks of a workspace, in storage order.
#[derive(Clone, Debug, Default)]
pub struct BlockStore {
    blocks: IndexMap<BlockId, Block>,
}

impl BlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from stored blocks. Every block's page must exist in `pages`,
    /// and nesting must obey the rules [`violations`](Self::violations)
    /// checks. Blocks whose parent is gone are accepted as orphans.
    pub fn from_blocks(blocks: impl IntoIterator<Item = Block>, pages: &PageTree) -> Result<Self> {
        let mut store = Self::new();
        for block in blocks {
            if store.blocks.contains_key(&block.id) {
                return Err(InvalidReason::DuplicateBlock(block.id).into());
            }
            if !pages.contains(block.page_id) {
                return Err(InvalidReason::DanglingPage {
                    block: block.id,
                    page: block.page_id,
                }
                .into());
            }
            store.blocks.insert(block.id, block);
        }
        if let Some(reason) = store.violations().into_iter().next() {
            return Err(reason.into());
        }
        Ok(store)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id)
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.blocks.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Every block in global storage order.
    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }

    /// Top-level (un-nested) blocks of `page`, in storage order.
    pub fn page_blocks(&self, page: PageId) -> Vec<&Block> {
        self.blocks
            .values()
            .filter(|b| b.page_id == page && b.is_root())
            .collect()
    }

    /// Blocks nested directly under `parent`, in storage order.
    pub fn child_blocks(&self, parent: BlockId) -> Vec<&Block> {
        self.blocks
            .values()
            .filter(|b| b.parent_block_id == Some(parent))
            .collect()
    }

    /// Blocks whose `parent_block_id` names a block that no longer exists.
    ///
    /// A one-level toggle delete leaves grandchildren in this state.
    pub fn orphans(&self) -> Vec<&Block> {
        self.blocks
            .values()
            .filter(|b| b.parent_block_id.is_some_and(|p| !self.blocks.contains_key(&p)))
            .collect()
    }

    /// Toggles (or blocks still carrying a children list) whose `children`
    /// disagree with the blocks that name them as parent.
    pub fn mismatched_toggles(&self) -> Vec<BlockId> {
        self.blocks
            .values()
            .filter(|b| b.kind == BlockKind::Toggle || !b.child_ids().is_empty())
            .filter(|toggle| {
                let listed: HashSet<BlockId> = toggle.child_ids().iter().copied().collect();
                let pointing: HashSet<BlockId> =
                    self.child_blocks(toggle.id).iter().map(|b| b.id).collect();
                listed != pointing
            })
            .map(|b| b.id)
            .collect()
    }

    /// Nesting rules the stored blocks break: a parent on another page, a
    /// parent that is not a toggle, or a `children` list out of step.
    ///
    /// Orphans are not reported here; see [`orphans`](Self::orphans).
    pub fn violations(&self) -> Vec<InvalidReason> {
        let mut out = Vec::new();
        for block in self.blocks.values() {
            let Some(parent_id) = block.parent_block_id else {
                continue;
            };
            let Some(parent) = self.blocks.get(&parent_id) else {
                continue;
            };
            if parent.page_id != block.page_id {
                out.push(InvalidReason::CrossPageParent {
                    parent: parent_id,
                    page: block.page_id,
                });
            } else if !parent.kind.is_container() {
                out.push(InvalidReason::ParentNotToggle(parent_id));
            }
        }
        out.extend(
            self.mismatched_toggles()
                .into_iter()
                .map(InvalidReason::ChildrenMismatch),
        );
        out
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Insert an empty text block on `page`.
    ///
    /// With `after`, the block lands directly behind it in storage order;
    /// otherwise it is appended. With `parent`, it is nested under that toggle
    /// and appended to the toggle's `children`.
    pub fn insert(
        &mut self,
        actor: &Actor<'_>,
        pages: &PageTree,
        id: BlockId,
        page: PageId,
        after: Option<BlockId>,
        parent: Option<BlockId>,
    ) -> Result<BlockId> {
        actor.authorize(page, pages.get(page))?;

        let position = match after {
            Some(after) => Some(
                self.blocks
                    .get_index_of(&after)
                    .ok_or(StoreError::BlockNotFound(after))?
                    + 1,
            ),
            None => None,
        };
        if let Some(parent) = parent {
            let toggle = self.get(parent).ok_or(StoreError::BlockNotFound(parent))?;
            if toggle.page_id != page {
                return Err(InvalidReason::CrossPageParent { parent, page }.into());
            }
            if !toggle.kind.is_container() {
                return Err(InvalidReason::ParentNotToggle(parent).into());
            }
        }
        if self.blocks.contains_key(&id) {
            return Err(InvalidReason::DuplicateBlock(id).into());
        }

        let mut block = Block::empty(id, page);
        block.parent_block_id = parent;
        match position {
            Some(index) => {
                self.blocks.shift_insert(index, id, block);
            }
            None => {
                self.blocks.insert(id, block);
            }
        }
        if let Some(toggle) = parent.and_then(|p| self.blocks.get_mut(&p)) {
            toggle.children.get_or_insert_with(Vec::new).push(id);
        }
        debug!(block = %id, page = %page, after = ?after, parent = ?parent, "block added");
        Ok(id)
    }

    /// Append an existing block without gating. Used when a page is created
    /// together with its first block.
    pub(crate) fn push(&mut self, block: Block) {
        self.blocks.insert(block.id, block);
    }

    /// Shallow-merge `patch` into the block.
    ///
    /// A block that stops being a toggle drops its `children` list, and the
    /// blocks that were nested under it become root blocks of the page,
    /// keeping their place in storage order.
    pub fn update(
        &mut self,
        actor: &Actor<'_>,
        pages: &PageTree,
        id: BlockId,
        patch: &BlockPatch,
    ) -> Result<&Block> {
        let page = self.get(id).ok_or(StoreError::BlockNotFound(id))?.page_id;
        actor.authorize(page, pages.get(page))?;
        let block = self.blocks.get_mut(&id).ok_or(StoreError::BlockNotFound(id))?;
        let before = block.child_ids().to_vec();
        block.apply(patch);
        if !block.kind.is_container() {
            block.children = None;
        }
        let kind = block.kind;
        let kept: HashSet<BlockId> = block.child_ids().iter().copied().collect();

        let released: Vec<BlockId> = before.into_iter().filter(|c| !kept.contains(c)).collect();
        for child in &released {
            if let Some(b) = self.blocks.get_mut(child) {
                if b.parent_block_id == Some(id) {
                    b.parent_block_id = None;
                }
            }
        }
        if !released.is_empty() {
            debug!(block = %id, released = released.len(), "nested blocks moved to page root");
        }
        debug!(block = %id, kind = %kind, "block updated");
        self.blocks.get(&id).ok_or(StoreError::BlockNotFound(id))
    }

    /// Remove a block. A toggle takes its children with it, one level deep or
    /// its whole subtree depending on `cascade`. The block is also dropped
    /// from its own parent's `children`.
    ///
    /// Returns the removed ids, `id` first.
    pub fn remove(
        &mut self,
        actor: &Actor<'_>,
        pages: &PageTree,
        id: BlockId,
        cascade: ToggleCascade,
    ) -> Result<Vec<BlockId>> {
        let block = self.get(id).ok_or(StoreError::BlockNotFound(id))?;
        actor.authorize(block.page_id, pages.get(block.page_id))?;
        let parent = block.parent_block_id;

        let mut removed = vec![id];
        if block.kind == BlockKind::Toggle {
            match cascade {
                ToggleCascade::OneLevel => removed.extend_from_slice(block.child_ids()),
                ToggleCascade::Recursive => removed.extend(self.subtree(id)),
            }
        }
        let doomed: HashSet<BlockId> = removed.iter().copied().collect();
        self.blocks.retain(|bid, _| !doomed.contains(bid));

        if let Some(children) = parent
            .and_then(|p| self.blocks.get_mut(&p))
            .and_then(|p| p.children.as_mut())
        {
            children.retain(|c| *c != id);
        }
        info!(block = %id, blocks = removed.len(), "block deleted");
        Ok(removed)
    }

    /// Flip a block's `is_expanded` flag. Gated like any block edit.
    pub fn toggle_expanded(&mut self, actor: &Actor<'_>, pages: &PageTree, id: BlockId) -> Result<bool> {
        let page = self.get(id).ok_or(StoreError::BlockNotFound(id))?.page_id;
        actor.authorize(page, pages.get(page))?;
        let block = self.blocks.get_mut(&id).ok_or(StoreError::BlockNotFound(id))?;
        let expanded = !block.is_expanded.unwrap_or(false);
        block.is_expanded = Some(expanded);
        Ok(expanded)
    }

    /// Drop every block on the given pages, ungated. Returns the removed ids.
    pub(crate) fn remove_pages(&mut self, pages: &HashSet<PageId>) -> Vec<BlockId> {
        let removed: Vec<BlockId> = self
            .blocks
            .values()
            .filter(|b| pages.contains(&b.page_id))
            .map(|b| b.id)
            .collect();
        self.blocks.retain(|_, b| !pages.contains(&b.page_id));
        removed
    }

    /// Everything listed below `root` through toggle `children` lists,
    /// depth-first, excluding `root`.
    fn subtree(&self, root: BlockId) -> Vec<BlockId> {
        let mut out = Vec::new();
        let mut seen = HashSet::from([root]);
        let mut stack: Vec<BlockId> = self
            .get(root)
            .map(|b| b.child_ids().iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            out.push(id);
            if let Some(block) = self.get(id) {
                stack.extend(block.child_ids().iter().rev().copied());
            }
        }
        out
    }
}

// ============================================================================
// Tests
// ============================================================================
