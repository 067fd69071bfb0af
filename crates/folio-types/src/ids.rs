//! Typed identifiers for users, workspaces, pages, blocks, and templates.
//!
//! All ID types wrap a UUID. Fresh IDs are UUIDv7 (time-ordered); seed data
//! uses UUIDv5 derived from a human label so that fixtures like `"page-2"`
//! always map to the same ID. They display as standard UUID text for logging.
//! The `short()` form (first 8 hex chars) is for human-facing output only,
//! never used as a lookup key.
//!
//! Pages and blocks share one UUID namespace but never one Rust type, so a
//! `BlockId` cannot be handed to a page operation by accident.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A user identifier.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(uuid::Uuid);

/// A workspace identifier.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceId(uuid::Uuid);

/// A page identifier.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(uuid::Uuid);

/// A block identifier.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(uuid::Uuid);

/// A template identifier.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(uuid::Uuid);

/// Fixed namespace for deriving deterministic IDs from labels via UUIDv5.
const FOLIO_LABEL_NS: uuid::Uuid = uuid::uuid!("5f0c2a8e-93d1-4b7a-8e25-c4a1f06d7b39");

// ── Shared behavior ─────────────────────────────────────────────────────────

macro_rules! impl_typed_id {
    ($T:ident, $name:literal) => {
        impl $T {
            /// Create a new time-ordered ID (UUIDv7).
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7())
            }

            /// Derive a stable ID from a human label (UUIDv5).
            ///
            /// The type name is mixed in, so `PageId::from_label("x")` and
            /// `BlockId::from_label("x")` never collide.
            pub fn from_label(label: &str) -> Self {
                let key = format!("{}:{}", $name, label);
                Self(uuid::Uuid::new_v5(&FOLIO_LABEL_NS, key.as_bytes()))
            }

            /// Build an ID from a raw 128-bit value (deterministic generators).
            pub fn from_u128(v: u128) -> Self {
                Self(uuid::Uuid::from_u128(v))
            }

            /// First 8 hex characters, for human display only (not lookup).
            pub fn short(&self) -> String {
                self.0.as_simple().to_string()[..8].to_string()
            }

            /// Full 32-character hex string (no hyphens).
            pub fn to_hex(&self) -> String {
                self.0.as_simple().to_string()
            }

            /// The raw 16 bytes.
            pub fn as_bytes(&self) -> &[u8; 16] {
                self.0.as_bytes()
            }

            /// Reconstruct from 16 bytes.
            pub fn from_bytes(b: [u8; 16]) -> Self {
                Self(uuid::Uuid::from_bytes(b))
            }

            /// Parse from a hex string (32 chars, no hyphens) or standard UUID format.
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                uuid::Uuid::parse_str(s).map(Self)
            }

            /// Check if a query string matches this ID by hex prefix.
            pub fn matches_hex_prefix(&self, prefix: &str) -> bool {
                self.to_hex().starts_with(prefix)
            }

            /// A nil / zero ID, for sentinel values only.
            pub fn nil() -> Self {
                Self(uuid::Uuid::nil())
            }

            /// Check if this is the nil ID.
            pub fn is_nil(&self) -> bool {
                self.0.is_nil()
            }
        }

        impl Default for $T {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<uuid::Uuid> for $T {
            fn from(u: uuid::Uuid) -> Self {
                Self(u)
            }
        }

        impl From<$T> for uuid::Uuid {
            fn from(id: $T) -> uuid::Uuid {
                id.0
            }
        }

        impl fmt::Display for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                // Full UUID with hyphens for log readability
                write!(f, "{}", self.0)
            }
        }

        impl fmt::Debug for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $name, self.short())
            }
        }

        impl PrefixResolvable for $T {
            fn matches_hex_prefix(&self, prefix: &str) -> bool {
                $T::matches_hex_prefix(self, prefix)
            }

            fn short(&self) -> String {
                $T::short(self)
            }
        }
    };
}

impl_typed_id!(UserId, "UserId");
impl_typed_id!(WorkspaceId, "WorkspaceId");
impl_typed_id!(PageId, "PageId");
impl_typed_id!(BlockId, "BlockId");
impl_typed_id!(TemplateId, "TemplateId");

// ── Prefix resolution ───────────────────────────────────────────────────────

/// Error from ambiguous prefix resolution.
#[derive(Debug, thiserror::Error)]
pub enum PrefixError {
    #[error("no match for '{0}'")]
    NoMatch(String),
    #[error("ambiguous prefix '{prefix}': matches {candidates:?}")]
    Ambiguous {
        prefix: String,
        candidates: Vec<String>,
    },
}

/// IDs that can be looked up by a hex prefix.
pub trait PrefixResolvable: Copy {
    fn matches_hex_prefix(&self, prefix: &str) -> bool;
    fn short(&self) -> String;
}

/// Resolve a query string against a set of IDs and optional labels.
///
/// Resolution order:
/// 1. Exact label match
/// 2. Unique label prefix match
/// 3. Unique hex prefix match
/// 4. Error (no match or ambiguous)
pub fn resolve_prefix<'a, T: PrefixResolvable>(
    entries: impl Iterator<Item = (T, Option<&'a str>)>,
    query: &str,
) -> Result<T, PrefixError> {
    let entries: Vec<(T, Option<&str>)> = entries.collect();

    if let Some(&(id, _)) = entries.iter().find(|(_, label)| *label == Some(query)) {
        return Ok(id);
    }

    let label_matches: Vec<(T, &str)> = entries
        .iter()
        .filter_map(|&(id, label)| label.filter(|l| l.starts_with(query)).map(|l| (id, l)))
        .collect();

    match label_matches.len() {
        0 => {}
        1 => return Ok(label_matches[0].0),
        _ => {
            return Err(PrefixError::Ambiguous {
                prefix: query.to_string(),
                candidates: label_matches.iter().map(|(_, l)| l.to_string()).collect(),
            });
        }
    }

    let hex_matches: Vec<T> = entries
        .iter()
        .filter(|(id, _)| id.matches_hex_prefix(query))
        .map(|(id, _)| *id)
        .collect();

    match hex_matches.len() {
        0 => Err(PrefixError::NoMatch(query.to_string())),
        1 => Ok(hex_matches[0]),
        _ => Err(PrefixError::Ambiguous {
            prefix: query.to_string(),
            candidates: hex_matches.iter().map(|id| id.short()).collect(),
        }),
    }
}

// ============================================================================
// Tests
// ============================================================================
