//! Error and outcome types for store commands.
//!
//! Every command either applies completely or leaves the store untouched and
//! returns a [`StoreError`]. Callers that only care about the coarse class of
//! failure (denied vs. not found vs. invalid) use [`StoreError::outcome_kind`]
//! or convert the whole result into an [`Outcome`].

use thiserror::Error;

use folio_types::{BlockId, PageId, TemplateId, UserId};

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors returned by store commands.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The actor may not mutate this page (or, for `add_page`, its parent).
    #[error("user {actor} may not edit page {page}")]
    Denied { actor: UserId, page: PageId },

    /// The actor may not change workspace-level settings.
    #[error("user {0} is not a workspace admin")]
    NotAdmin(UserId),

    #[error("page not found: {0:?}")]
    PageNotFound(PageId),

    #[error("block not found: {0:?}")]
    BlockNotFound(BlockId),

    #[error("template not found: {0:?}")]
    TemplateNotFound(TemplateId),

    #[error("user not found: {0}")]
    UserNotFound(String),

    /// The request was understood but breaks a model rule.
    #[error("invalid: {0}")]
    Invalid(#[from] InvalidReason),

    /// The id generator kept returning ids that are already live.
    #[error("id generator returned live ids {attempts} times in a row")]
    IdsExhausted { attempts: usize },

    /// A snapshot or seed file could not be read.
    #[error("snapshot error: {0}")]
    Snapshot(String),
}

/// Why a command or snapshot was rejected as invalid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidReason {
    #[error("page title must not be blank")]
    BlankTitle,

    #[error("workspace name must not be blank")]
    WorkspaceNameBlank,

    #[error("user display name must not be blank")]
    BlankDisplayName,

    #[error("creator {creator} cannot be removed from page {page}")]
    CreatorRemoved { page: PageId, creator: UserId },

    #[error("user {0} is not in the workspace directory")]
    UnknownUser(UserId),

    #[error("block {0:?} is not a toggle and cannot hold children")]
    ParentNotToggle(BlockId),

    #[error("parent block {parent:?} belongs to another page than {page:?}")]
    CrossPageParent { parent: BlockId, page: PageId },

    #[error("toggle {0:?} lists children that disagree with the blocks nested under it")]
    ChildrenMismatch(BlockId),

    #[error("page {0:?} is its own ancestor")]
    Cycle(PageId),

    #[error("page {page:?} references missing parent {parent:?}")]
    DanglingParent { page: PageId, parent: PageId },

    #[error("block {block:?} references missing page {page:?}")]
    DanglingPage { block: BlockId, page: PageId },

    #[error("duplicate page id {0:?}")]
    DuplicatePage(PageId),

    #[error("duplicate block id {0:?}")]
    DuplicateBlock(BlockId),

    #[error("duplicate user id {0}")]
    DuplicateUser(UserId),

    #[error("unknown label '{0}'")]
    UnknownLabel(String),
}

/// Coarse classification of a failed command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutcomeKind {
    Denied,
    NotFound,
    Invalid,
}

impl StoreError {
    pub fn outcome_kind(&self) -> OutcomeKind {
        match self {
            StoreError::Denied { .. } | StoreError::NotAdmin(_) => OutcomeKind::Denied,
            StoreError::PageNotFound(_)
            | StoreError::BlockNotFound(_)
            | StoreError::TemplateNotFound(_)
            | StoreError::UserNotFound(_) => OutcomeKind::NotFound,
            StoreError::Invalid(_)
            | StoreError::IdsExhausted { .. }
            | StoreError::Snapshot(_) => OutcomeKind::Invalid,
        }
    }

    pub fn is_denied(&self) -> bool {
        self.outcome_kind() == OutcomeKind::Denied
    }

    pub fn is_not_found(&self) -> bool {
        self.outcome_kind() == OutcomeKind::NotFound
    }
}

/// Tagged result of a command, for callers that report rather than branch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome<T> {
    Applied(T),
    Denied,
    NotFound,
    Invalid(String),
}

impl<T> Outcome<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }

    /// The applied value, if any.
    pub fn applied(self) -> Option<T> {
        match self {
            Outcome::Applied(v) => Some(v),
            _ => None,
        }
    }

    /// Short label for logs and CLI output.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Applied(_) => "applied",
            Outcome::Denied => "denied",
            Outcome::NotFound => "not-found",
            Outcome::Invalid(_) => "invalid",
        }
    }
}

impl<T> From<Result<T>> for Outcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(v) => Outcome::Applied(v),
            Err(e) => match e.outcome_kind() {
                OutcomeKind::Denied => Outcome::Denied,
                OutcomeKind::NotFound => Outcome::NotFound,
                OutcomeKind::Invalid => Outcome::Invalid(e.to_string()),
            },
        }
    }
}
