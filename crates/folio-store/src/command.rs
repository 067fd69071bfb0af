//! Commands as values.
//!
//! A [`Command`] is one user intent, the same set the typed methods on
//! [`FolioStore`](crate::FolioStore) expose. Input layers build these (or
//! deserialize them from a script) and hand them to
//! [`FolioStore::execute`](crate::FolioStore::execute), which answers with an
//! [`Outcome`](crate::Outcome) carrying an [`Effect`].

use serde::{Deserialize, Serialize};

use folio_types::{BlockId, BlockKind, BlockPatch, PageId, Role, TemplateId, UserId};

use crate::transition::EditEffect;

/// A mutation or selection request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    // Workspace
    RenameWorkspace { name: String },
    AddUser { display_name: String, role: Role },

    // Pages
    AddPage { parent: Option<PageId> },
    DeletePage { page: PageId },
    UpdatePageTitle { page: PageId, title: String },
    UpdatePageIcon { page: PageId, icon: Option<String> },
    UpdatePageAccess { page: PageId, users: Vec<UserId> },
    GrantAccess { page: PageId, user: UserId },
    RevokeAccess { page: PageId, user: UserId },
    TogglePageExpansion { page: PageId },

    // Navigation
    SelectPage { page: PageId },
    SelectTemplate { template: TemplateId },

    // Blocks
    AddBlock {
        page: PageId,
        #[serde(default)]
        after: Option<BlockId>,
        #[serde(default)]
        parent: Option<BlockId>,
    },
    UpdateBlock { block: BlockId, patch: BlockPatch },
    DeleteBlock { block: BlockId },
    ToggleBlockExpansion { block: BlockId },
    ConvertBlock { block: BlockId, kind: BlockKind },
    DismissConversion { block: BlockId },
}

impl Command {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::RenameWorkspace { .. } => "rename_workspace",
            Command::AddUser { .. } => "add_user",
            Command::AddPage { .. } => "add_page",
            Command::DeletePage { .. } => "delete_page",
            Command::UpdatePageTitle { .. } => "update_page_title",
            Command::UpdatePageIcon { .. } => "update_page_icon",
            Command::UpdatePageAccess { .. } => "update_page_access",
            Command::GrantAccess { .. } => "grant_access",
            Command::RevokeAccess { .. } => "revoke_access",
            Command::TogglePageExpansion { .. } => "toggle_page_expansion",
            Command::SelectPage { .. } => "select_page",
            Command::SelectTemplate { .. } => "select_template",
            Command::AddBlock { .. } => "add_block",
            Command::UpdateBlock { .. } => "update_block",
            Command::DeleteBlock { .. } => "delete_block",
            Command::ToggleBlockExpansion { .. } => "toggle_block_expansion",
            Command::ConvertBlock { .. } => "convert_block",
            Command::DismissConversion { .. } => "dismiss_conversion",
        }
    }
}

/// Everything a page delete took with it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PageRemoval {
    /// The page and its descendants, the page first.
    pub pages: Vec<PageId>,
    /// Blocks that lived on any removed page.
    pub blocks: Vec<BlockId>,
}

/// What an applied command produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Effect {
    Done,
    UserAdded(UserId),
    PageCreated(PageId),
    PagesDeleted(PageRemoval),
    BlockCreated(BlockId),
    BlockEdited(EditEffect),
    BlocksDeleted(Vec<BlockId>),
    Expanded(bool),
}
