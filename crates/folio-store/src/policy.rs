//! Access policy: who may mutate which page.
//!
//! The policy is a pure predicate. Stores never consult the acting user's
//! role directly; every gate goes through an [`Actor`], which pairs the user
//! with the policy in force and turns a refusal into a [`StoreError`].

use folio_types::{Page, PageId, User};
use tracing::warn;

use crate::error::{Result, StoreError};

/// Decides whether a user may mutate a page or the workspace itself.
pub trait AccessPolicy: Send + Sync {
    /// Whether `actor` may mutate `page` (its metadata or any of its blocks).
    /// A missing page is never editable.
    fn can_edit(&self, actor: &User, page: Option<&Page>) -> bool;

    /// Whether `actor` may change workspace-level settings.
    fn can_administer(&self, actor: &User) -> bool;
}

/// Admins edit everything; members edit pages whose access list names them.
#[derive(Debug, Default, Clone, Copy)]
pub struct RolePolicy;

impl AccessPolicy for RolePolicy {
    fn can_edit(&self, actor: &User, page: Option<&Page>) -> bool {
        match page {
            None => false,
            Some(_) if actor.is_admin() => true,
            Some(page) => page.grants(actor.id),
        }
    }

    fn can_administer(&self, actor: &User) -> bool {
        actor.is_admin()
    }
}

/// The acting user plus the policy that judges them.
#[derive(Clone, Copy)]
pub struct Actor<'a> {
    user: &'a User,
    policy: &'a dyn AccessPolicy,
}

impl<'a> Actor<'a> {
    pub fn new(user: &'a User, policy: &'a dyn AccessPolicy) -> Self {
        Self { user, policy }
    }

    pub fn user(&self) -> &'a User {
        self.user
    }

    pub fn can_edit(&self, page: Option<&Page>) -> bool {
        self.policy.can_edit(self.user, page)
    }

    /// Gate a mutation of an existing page.
    ///
    /// Missing page: `PageNotFound`. Refused: `Denied`.
    pub fn authorize<'p>(&self, id: PageId, page: Option<&'p Page>) -> Result<&'p Page> {
        let Some(page) = page else {
            return Err(StoreError::PageNotFound(id));
        };
        if self.can_edit(Some(page)) {
            Ok(page)
        } else {
            Err(self.denied(id))
        }
    }

    /// Gate creation of a child under `id`. An unknown parent is a refusal,
    /// not a lookup failure.
    pub fn authorize_parent(&self, id: PageId, page: Option<&Page>) -> Result<()> {
        if self.can_edit(page) {
            Ok(())
        } else {
            Err(self.denied(id))
        }
    }

    /// Gate a workspace-level change.
    pub fn authorize_admin(&self) -> Result<()> {
        if self.policy.can_administer(self.user) {
            Ok(())
        } else {
            warn!(actor = %self.user.id, "workspace change denied");
            Err(StoreError::NotAdmin(self.user.id))
        }
    }

    fn denied(&self, page: PageId) -> StoreError {
        warn!(actor = %self.user.id, page = %page, "page mutation denied");
        StoreError::Denied {
            actor: self.user.id,
            page,
        }
    }
}

impl std::fmt::Debug for Actor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Actor").field("user", &self.user.id).finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
