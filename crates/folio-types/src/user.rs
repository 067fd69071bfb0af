//! Users and roles.
//!
//! A `User` is anyone who can act on a workspace. Roles are the only privilege
//! tiers: admins bypass every page access list, members are gated by them.
//! How a user proves who they are is not this crate's concern.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::EnumString;

use crate::ids::UserId;

/// Privilege tier of a user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum Role {
    /// Bypasses all page access checks; may rename the workspace.
    Admin,
    /// Edits only pages whose access list names them.
    #[default]
    #[serde(alias = "user")]
    #[strum(serialize = "member", serialize = "user")]
    Member,
}

impl Role {
    /// Parse from string (case-insensitive). Accepts `"user"` for `Member`.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Member => "member",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An entity that can act on the workspace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Full display name: "Admin Rey", "User Bob".
    pub display_name: String,
    pub role: Role,
}

impl User {
    /// Create a new user with a fresh ID.
    pub fn new(display_name: impl Into<String>, role: Role) -> Self {
        Self {
            id: UserId::new(),
            display_name: display_name.into(),
            role,
        }
    }

    /// Create a user with a known ID (seed data, tests).
    pub fn with_id(id: UserId, display_name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Display initials, e.g. "AR" for "Admin Rey".
    pub fn initials(&self) -> String {
        self.display_name
            .split_whitespace()
            .filter_map(|w| w.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect()
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.display_name, self.role)
    }
}

// ============================================================================
// Tests
// ============================================================================
