//! Store configuration.
//!
//! Every field has a default, so a config file only names what it changes:
//!
//! ```ron
//! (
//!     trigger: '/',
//!     default_code_language: "rust",
//!     toggle_cascade: Recursive,
//! )
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// How far deleting a toggle block reaches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToggleCascade {
    /// Remove the toggle and its direct children. Grandchildren stay behind.
    #[default]
    OneLevel,
    /// Remove the toggle's whole subtree.
    Recursive,
}

/// Tunables for a [`FolioStore`](crate::FolioStore).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Character that opens the block conversion menu.
    pub trigger: char,
    /// Title given to new pages.
    pub default_page_title: String,
    /// Icon given to new pages. `None` creates pages without an icon.
    pub default_page_icon: Option<String>,
    /// Language set when a block becomes a code block.
    pub default_code_language: String,
    pub toggle_cascade: ToggleCascade,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            trigger: '/',
            default_page_title: "Untitled".into(),
            default_page_icon: Some("📄".into()),
            default_code_language: "javascript".into(),
            toggle_cascade: ToggleCascade::OneLevel,
        }
    }
}

impl StoreConfig {
    /// Parse a RON config document.
    pub fn from_ron(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| StoreError::Snapshot(format!("config: {e}")))
    }

    /// Set the conversion trigger.
    pub fn with_trigger(mut self, trigger: char) -> Self {
        self.trigger = trigger;
        self
    }

    /// Set the cascade depth for toggle deletion.
    pub fn with_toggle_cascade(mut self, cascade: ToggleCascade) -> Self {
        self.toggle_cascade = cascade;
        self
    }

    pub fn with_code_language(mut self, language: impl Into<String>) -> Self {
        self.default_code_language = language.into();
        self
    }
}
