//! The `FolioStore` façade.
//!
//! Owns every piece of workspace state and exposes one method per command.
//! Each command takes the acting user explicitly, resolves the gate through
//! the configured [`AccessPolicy`], and either applies fully or returns a
//! [`StoreError`] with nothing changed.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use folio_types::{
    Block, BlockId, BlockKind, BlockPatch, Page, PageId, Role, Template, TemplateId, User,
    UserId, Workspace,
};

use crate::block_store::BlockStore;
use crate::command::{Command, Effect, PageRemoval};
use crate::config::StoreConfig;
use crate::directory::UserDirectory;
use crate::error::{InvalidReason, Outcome, Result, StoreError};
use crate::identity::{IdGenerator, TimeOrderedIds};
use crate::page_tree::PageTree;
use crate::policy::{AccessPolicy, Actor, RolePolicy};
use crate::transition::{BlockTypeTransition, EditEffect, MenuEntry};

/// Draws from the id generator before a create gives up.
const MAX_ID_ATTEMPTS: usize = 64;

/// What the navigation currently shows. A page and a template are never
/// selected at the same time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    #[default]
    None,
    Page(PageId),
    Template(TemplateId),
}

impl Selection {
    pub fn page(&self) -> Option<PageId> {
        match self {
            Selection::Page(id) => Some(*id),
            _ => None,
        }
    }

    pub fn template(&self) -> Option<TemplateId> {
        match self {
            Selection::Template(id) => Some(*id),
            _ => None,
        }
    }
}

/// In-memory workspace: pages, blocks, users, selection.
pub struct FolioStore {
    pub(crate) workspace: Workspace,
    pub(crate) users: UserDirectory,
    pub(crate) pages: PageTree,
    pub(crate) blocks: BlockStore,
    pub(crate) selection: Selection,
    pub(crate) templates: Vec<Template>,
    pub(crate) policy: Arc<dyn AccessPolicy>,
    pub(crate) ids: Box<dyn IdGenerator>,
    pub(crate) transition: BlockTypeTransition,
    pub(crate) config: StoreConfig,
}

impl FolioStore {
    /// An empty workspace with the default role policy and UUIDv7 ids.
    pub fn new(workspace: Workspace, config: StoreConfig) -> Self {
        Self {
            workspace,
            users: UserDirectory::new(),
            pages: PageTree::new(),
            blocks: BlockStore::new(),
            selection: Selection::None,
            templates: Template::builtin(),
            policy: Arc::new(RolePolicy),
            ids: Box::new(TimeOrderedIds),
            transition: BlockTypeTransition::new(&config),
            config,
        }
    }

    pub fn with_policy(mut self, policy: Arc<dyn AccessPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_ids(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Register a user without a gate. For bootstrapping a workspace.
    pub fn register_user(&mut self, user: User) -> Result<UserId> {
        self.users.register(user)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn users(&self) -> &UserDirectory {
        &self.users
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.get(id)
    }

    pub fn page_tree(&self) -> &PageTree {
        &self.pages
    }

    pub fn block_store(&self) -> &BlockStore {
        &self.blocks
    }

    pub fn page(&self, id: PageId) -> Option<&Page> {
        self.pages.get(id)
    }

    /// All pages in storage order.
    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter()
    }

    pub fn root_pages(&self) -> Vec<&Page> {
        self.pages.roots()
    }

    pub fn child_pages(&self, parent: PageId) -> Vec<&Page> {
        self.pages.children(parent)
    }

    pub fn descendants(&self, page: PageId) -> Vec<PageId> {
        self.pages.descendants(page)
    }

    /// `page` and its ancestors, nearest first.
    pub fn ancestry(&self, page: PageId) -> Vec<&Page> {
        self.pages.ancestry(page)
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id)
    }

    /// All blocks in global storage order.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Top-level blocks of `page`.
    pub fn page_blocks(&self, page: PageId) -> Vec<&Block> {
        self.blocks.page_blocks(page)
    }

    pub fn child_blocks(&self, parent: BlockId) -> Vec<&Block> {
        self.blocks.child_blocks(parent)
    }

    /// Whether `actor` may currently mutate `page`.
    pub fn can_edit_page(&self, actor: &User, page: PageId) -> bool {
        self.policy.can_edit(actor, self.pages.get(page))
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn selected_page(&self) -> Option<&Page> {
        self.selection.page().and_then(|id| self.pages.get(id))
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn template(&self, id: TemplateId) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn conversion_menu(&self) -> &'static [MenuEntry] {
        self.transition.menu()
    }

    pub fn transition(&self) -> &BlockTypeTransition {
        &self.transition
    }

    // ========================================================================
    // Workspace commands
    // ========================================================================

    /// Rename the workspace. Admin only; trimmed; blank refused.
    pub fn rename_workspace(&mut self, actor: &User, name: &str) -> Result<()> {
        Actor::new(actor, self.policy.as_ref()).authorize_admin()?;
        let name = name.trim();
        if name.is_empty() {
            return Err(InvalidReason::WorkspaceNameBlank.into());
        }
        self.workspace.name = name.to_string();
        debug!(workspace = %self.workspace.id, "workspace renamed");
        Ok(())
    }

    /// Add a user to the directory. Admin only.
    pub fn add_user(&mut self, actor: &User, display_name: &str, role: Role) -> Result<UserId> {
        let actor = Actor::new(actor, self.policy.as_ref());
        self.users.add(&actor, display_name, role)
    }

    // ========================================================================
    // Page commands
    // ========================================================================

    /// Create a page with one empty text block and select it.
    ///
    /// Creating under a parent the actor cannot edit, or one that does not
    /// exist, is refused as `Denied`.
    pub fn add_page(&mut self, actor: &User, parent: Option<PageId>) -> Result<PageId> {
        let id = self.fresh_page_id()?;
        let block = self.fresh_block_id(Some(id))?;
        let actor = Actor::new(actor, self.policy.as_ref());
        self.pages.create(
            &actor,
            id,
            parent,
            &self.config.default_page_title,
            self.config.default_page_icon.clone(),
        )?;
        self.blocks.push(Block::empty(block, id));
        self.selection = Selection::Page(id);
        Ok(id)
    }

    /// Delete a page, its descendants, and every block on any of them.
    ///
    /// If the selection was among the removed pages it moves to the first
    /// remaining page, or to nothing.
    pub fn delete_page(&mut self, actor: &User, page: PageId) -> Result<PageRemoval> {
        let actor = Actor::new(actor, self.policy.as_ref());
        let pages = self.pages.remove(&actor, page)?;
        let doomed: HashSet<PageId> = pages.iter().copied().collect();
        let blocks = self.blocks.remove_pages(&doomed);

        if let Selection::Page(selected) = self.selection {
            if doomed.contains(&selected) {
                self.selection = self
                    .pages
                    .first()
                    .map_or(Selection::None, |p| Selection::Page(p.id));
            }
        }
        info!(page = %page, pages = pages.len(), blocks = blocks.len(), "page deleted");
        Ok(PageRemoval { pages, blocks })
    }

    pub fn update_page_title(&mut self, actor: &User, page: PageId, title: &str) -> Result<()> {
        let actor = Actor::new(actor, self.policy.as_ref());
        self.pages.rename(&actor, page, title)
    }

    pub fn update_page_icon(
        &mut self,
        actor: &User,
        page: PageId,
        icon: Option<String>,
    ) -> Result<()> {
        let actor = Actor::new(actor, self.policy.as_ref());
        self.pages.set_icon(&actor, page, icon)
    }

    /// Replace the access list. Every entry must be a known user and the
    /// creator must stay on it.
    pub fn update_page_access(
        &mut self,
        actor: &User,
        page: PageId,
        users: &[UserId],
    ) -> Result<()> {
        let actor = Actor::new(actor, self.policy.as_ref());
        actor.authorize(page, self.pages.get(page))?;
        self.require_known(users)?;
        self.pages.set_access(&actor, page, users)
    }

    pub fn grant_access(&mut self, actor: &User, page: PageId, user: UserId) -> Result<()> {
        let actor = Actor::new(actor, self.policy.as_ref());
        actor.authorize(page, self.pages.get(page))?;
        self.require_known(&[user])?;
        self.pages.grant(&actor, page, user)
    }

    pub fn revoke_access(&mut self, actor: &User, page: PageId, user: UserId) -> Result<()> {
        let actor = Actor::new(actor, self.policy.as_ref());
        self.pages.revoke(&actor, page, user)
    }

    /// Flip a page's navigation expansion. Any user may do this.
    pub fn toggle_page_expansion(&mut self, page: PageId) -> Result<bool> {
        self.pages.toggle_expanded(page)
    }

    pub fn select_page(&mut self, page: PageId) -> Result<()> {
        if !self.pages.contains(page) {
            return Err(StoreError::PageNotFound(page));
        }
        self.selection = Selection::Page(page);
        Ok(())
    }

    pub fn select_template(&mut self, template: TemplateId) -> Result<()> {
        if self.template(template).is_none() {
            return Err(StoreError::TemplateNotFound(template));
        }
        self.selection = Selection::Template(template);
        Ok(())
    }

    // ========================================================================
    // Block commands
    // ========================================================================

    /// Insert an empty text block on `page`, optionally behind `after` and
    /// optionally nested under the toggle `parent`.
    pub fn add_block(
        &mut self,
        actor: &User,
        page: PageId,
        after: Option<BlockId>,
        parent: Option<BlockId>,
    ) -> Result<BlockId> {
        let id = self.fresh_block_id(None)?;
        let actor = Actor::new(actor, self.policy.as_ref());
        self.blocks.insert(&actor, &self.pages, id, page, after, parent)
    }

    /// Merge `patch` into a block. Reports whether new content ends with the
    /// conversion trigger; it never converts by itself.
    pub fn update_block(
        &mut self,
        actor: &User,
        block: BlockId,
        patch: &BlockPatch,
    ) -> Result<EditEffect> {
        let actor = Actor::new(actor, self.policy.as_ref());
        let updated = self.blocks.update(&actor, &self.pages, block, patch)?;
        Ok(match patch.content {
            Some(_) => self.transition.effect_of(&updated.content),
            None => EditEffect::None,
        })
    }

    /// Delete a block; toggles cascade per [`StoreConfig::toggle_cascade`].
    pub fn delete_block(&mut self, actor: &User, block: BlockId) -> Result<Vec<BlockId>> {
        let actor = Actor::new(actor, self.policy.as_ref());
        self.blocks
            .remove(&actor, &self.pages, block, self.config.toggle_cascade)
    }

    pub fn toggle_block_expansion(&mut self, actor: &User, block: BlockId) -> Result<bool> {
        let actor = Actor::new(actor, self.policy.as_ref());
        self.blocks.toggle_expanded(&actor, &self.pages, block)
    }

    /// Convert a block to `kind` as chosen from the conversion menu.
    ///
    /// Gated at the moment of conversion, independent of the edit that
    /// opened the menu.
    pub fn convert_block(&mut self, actor: &User, block: BlockId, kind: BlockKind) -> Result<()> {
        let current = self.blocks.get(block).ok_or(StoreError::BlockNotFound(block))?;
        let patch = self.transition.conversion_patch(current, kind);
        let actor = Actor::new(actor, self.policy.as_ref());
        self.blocks.update(&actor, &self.pages, block, &patch)?;
        Ok(())
    }

    /// The conversion menu was closed without a choice: drop the trailing trigger.
    pub fn dismiss_conversion(&mut self, actor: &User, block: BlockId) -> Result<()> {
        let current = self.blocks.get(block).ok_or(StoreError::BlockNotFound(block))?;
        let page = current.page_id;
        let patch = self.transition.dismissal_patch(current);
        let actor = Actor::new(actor, self.policy.as_ref());
        match patch {
            Some(patch) => {
                self.blocks.update(&actor, &self.pages, block, &patch)?;
            }
            None => {
                actor.authorize(page, self.pages.get(page))?;
            }
        }
        Ok(())
    }

    // ========================================================================
    // Command values
    // ========================================================================

    /// Run one command and report its outcome.
    pub fn execute(&mut self, actor: &User, command: Command) -> Outcome<Effect> {
        let name = command.name();
        let result = self.dispatch(actor, command);
        if let Err(e) = &result {
            debug!(command = name, actor = %actor.id, error = %e, "command not applied");
        }
        result.into()
    }

    fn dispatch(&mut self, actor: &User, command: Command) -> Result<Effect> {
        Ok(match command {
            Command::RenameWorkspace { name } => {
                self.rename_workspace(actor, &name)?;
                Effect::Done
            }
            Command::AddUser { display_name, role } => {
                Effect::UserAdded(self.add_user(actor, &display_name, role)?)
            }
            Command::AddPage { parent } => Effect::PageCreated(self.add_page(actor, parent)?),
            Command::DeletePage { page } => Effect::PagesDeleted(self.delete_page(actor, page)?),
            Command::UpdatePageTitle { page, title } => {
                self.update_page_title(actor, page, &title)?;
                Effect::Done
            }
            Command::UpdatePageIcon { page, icon } => {
                self.update_page_icon(actor, page, icon)?;
                Effect::Done
            }
            Command::UpdatePageAccess { page, users } => {
                self.update_page_access(actor, page, &users)?;
                Effect::Done
            }
            Command::GrantAccess { page, user } => {
                self.grant_access(actor, page, user)?;
                Effect::Done
            }
            Command::RevokeAccess { page, user } => {
                self.revoke_access(actor, page, user)?;
                Effect::Done
            }
            Command::TogglePageExpansion { page } => {
                Effect::Expanded(self.toggle_page_expansion(page)?)
            }
            Command::SelectPage { page } => {
                self.select_page(page)?;
                Effect::Done
            }
            Command::SelectTemplate { template } => {
                self.select_template(template)?;
                Effect::Done
            }
            Command::AddBlock {
                page,
                after,
                parent,
            } => Effect::BlockCreated(self.add_block(actor, page, after, parent)?),
            Command::UpdateBlock { block, patch } => {
                Effect::BlockEdited(self.update_block(actor, block, &patch)?)
            }
            Command::DeleteBlock { block } => {
                Effect::BlocksDeleted(self.delete_block(actor, block)?)
            }
            Command::ToggleBlockExpansion { block } => {
                Effect::Expanded(self.toggle_block_expansion(actor, block)?)
            }
            Command::ConvertBlock { block, kind } => {
                self.convert_block(actor, block, kind)?;
                Effect::Done
            }
            Command::DismissConversion { block } => {
                self.dismiss_conversion(actor, block)?;
                Effect::Done
            }
        })
    }

    // ========================================================================
    // Invariants
    // ========================================================================

    /// Every structural rule the current state breaks.
    ///
    /// Grandchildren left behind by a one-level toggle delete are not
    /// violations; [`orphans`](Self::orphans) lists them.
    pub fn violations(&self) -> Vec<InvalidReason> {
        let mut out = self.pages.violations();
        out.extend(self.blocks.violations());
        for block in self.blocks.iter() {
            if !self.pages.contains(block.page_id) {
                out.push(InvalidReason::DanglingPage {
                    block: block.id,
                    page: block.page_id,
                });
            }
        }
        out
    }

    /// Blocks whose parent toggle no longer exists.
    pub fn orphans(&self) -> Vec<&Block> {
        self.blocks.orphans()
    }

    /// `Ok` when [`violations`](Self::violations) is empty, else the first one.
    pub fn check_invariants(&self) -> Result<()> {
        match self.violations().into_iter().next() {
            None => Ok(()),
            Some(reason) => Err(reason.into()),
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn require_known(&self, users: &[UserId]) -> Result<()> {
        match users.iter().find(|u| !self.users.contains(**u)) {
            Some(unknown) => Err(InvalidReason::UnknownUser(*unknown).into()),
            None => Ok(()),
        }
    }

    /// Pages and blocks share one id space.
    fn id_in_use(&self, bytes: [u8; 16]) -> bool {
        self.pages.contains(PageId::from_bytes(bytes))
            || self.blocks.contains(BlockId::from_bytes(bytes))
    }

    fn fresh_page_id(&mut self) -> Result<PageId> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.ids.next_page_id();
            if !self.id_in_use(*id.as_bytes()) {
                return Ok(id);
            }
            warn!(page = %id, "id generator produced a live id, retrying");
        }
        Err(StoreError::IdsExhausted {
            attempts: MAX_ID_ATTEMPTS,
        })
    }

    /// `pending` is a page id drawn for the same command but not stored yet.
    fn fresh_block_id(&mut self, pending: Option<PageId>) -> Result<BlockId> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.ids.next_block_id();
            let bytes = *id.as_bytes();
            let taken = pending.is_some_and(|p| *p.as_bytes() == bytes);
            if !taken && !self.id_in_use(bytes) {
                return Ok(id);
            }
            warn!(block = %id, "id generator produced a live id, retrying");
        }
        Err(StoreError::IdsExhausted {
            attempts: MAX_ID_ATTEMPTS,
        })
    }
}

impl std::fmt::Debug for FolioStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FolioStore")
            .field("workspace", &self.workspace.name)
            .field("users", &self.users.len())
            .field("pages", &self.pages.len())
            .field("blocks", &self.blocks.len())
            .field("selection", &self.selection)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
