//! Workspace user directory.

use indexmap::IndexMap;
use tracing::debug;

use folio_types::{Role, User, UserId, resolve_prefix};

use crate::error::{InvalidReason, Result, StoreError};
use crate::policy::Actor;

/// Known users in registration order.
#[derive(Clone, Debug, Default)]
pub struct UserDirectory {
    users: IndexMap<UserId, User>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list, rejecting duplicate ids.
    pub fn from_users(users: impl IntoIterator<Item = User>) -> Result<Self> {
        let mut dir = Self::new();
        for user in users {
            dir.register(user)?;
        }
        Ok(dir)
    }

    /// Insert without a gate (bootstrap, snapshot loading).
    pub fn register(&mut self, user: User) -> Result<UserId> {
        if self.users.contains_key(&user.id) {
            return Err(InvalidReason::DuplicateUser(user.id).into());
        }
        let id = user.id;
        self.users.insert(id, user);
        Ok(id)
    }

    /// Register a user. Admin only.
    pub fn add(&mut self, actor: &Actor<'_>, display_name: &str, role: Role) -> Result<UserId> {
        actor.authorize_admin()?;
        let name = display_name.trim();
        if name.is_empty() {
            return Err(InvalidReason::BlankDisplayName.into());
        }
        let user = User::new(name, role);
        let id = user.id;
        self.users.insert(id, user);
        debug!(user = %id, %role, "user added");
        Ok(id)
    }

    pub fn get(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    pub fn contains(&self, id: UserId) -> bool {
        self.users.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Find a user by seed label (`"user-2"`), full UUID, display name (any
    /// case) or a unique prefix of the name or id.
    pub fn lookup(&self, query: &str) -> Result<&User> {
        if let Some(user) = self.users.get(&UserId::from_label(query)) {
            return Ok(user);
        }
        if let Some(user) = UserId::parse(query).ok().and_then(|id| self.users.get(&id)) {
            return Ok(user);
        }
        if let Some(user) = self
            .users
            .values()
            .find(|u| u.display_name.eq_ignore_ascii_case(query))
        {
            return Ok(user);
        }
        let entries = self
            .users
            .values()
            .map(|u| (u.id, Some(u.display_name.as_str())));
        resolve_prefix(entries, query)
            .ok()
            .and_then(|id| self.users.get(&id))
            .ok_or_else(|| StoreError::UserNotFound(query.to_string()))
    }
}
