//! Block type conversion through the trigger menu.
//!
//! Typing the trigger character (`/` by default) at the end of a block's
//! content offers a conversion menu. Editing only *reports* that the offer
//! applies; converting is a separate, explicit command that goes through the
//! access gate again. That keeps "typed a slash" and "changed the block
//! type" distinct events.

use serde::Serialize;

use folio_types::{Block, BlockKind, BlockPatch};

use crate::config::StoreConfig;

/// One entry of the conversion menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    pub kind: BlockKind,
    pub label: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
}

/// Conversion targets in menu order.
pub const CONVERSION_MENU: [MenuEntry; 8] = [
    MenuEntry {
        kind: BlockKind::Text,
        label: "Text",
        icon: "📝",
        description: "Simple text block",
    },
    MenuEntry {
        kind: BlockKind::Heading,
        label: "Heading",
        icon: "📋",
        description: "Large heading text",
    },
    MenuEntry {
        kind: BlockKind::Todo,
        label: "To-do",
        icon: "☑️",
        description: "Checkbox with text",
    },
    MenuEntry {
        kind: BlockKind::Image,
        label: "Image",
        icon: "🖼️",
        description: "Upload and display image",
    },
    MenuEntry {
        kind: BlockKind::File,
        label: "File",
        icon: "📎",
        description: "Upload a file",
    },
    MenuEntry {
        kind: BlockKind::Toggle,
        label: "Toggle",
        icon: "▶️",
        description: "Collapsible content block",
    },
    MenuEntry {
        kind: BlockKind::Divider,
        label: "Divider",
        icon: "➖",
        description: "Horizontal divider line",
    },
    MenuEntry {
        kind: BlockKind::Code,
        label: "Code",
        icon: "💻",
        description: "Code block with syntax",
    },
];

/// Languages offered for code blocks, as `(value, label)`.
pub const CODE_LANGUAGES: [(&str, &str); 7] = [
    ("javascript", "JavaScript"),
    ("python", "Python"),
    ("typescript", "TypeScript"),
    ("html", "HTML"),
    ("css", "CSS"),
    ("json", "JSON"),
    ("plaintext", "Plain Text"),
];

/// What an edit means for the input layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum EditEffect {
    #[default]
    None,
    /// Content now ends with the trigger; the conversion menu may be shown.
    OfferConversion,
}

/// Builds the patches that convert a block or dismiss the menu.
#[derive(Clone, Debug)]
pub struct BlockTypeTransition {
    trigger: char,
    code_language: String,
}

impl BlockTypeTransition {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            trigger: config.trigger,
            code_language: config.default_code_language.clone(),
        }
    }

    pub fn trigger(&self) -> char {
        self.trigger
    }

    pub fn menu(&self) -> &'static [MenuEntry] {
        &CONVERSION_MENU
    }

    pub fn ends_with_trigger(&self, content: &str) -> bool {
        content.ends_with(self.trigger)
    }

    /// Classify freshly written content.
    pub fn effect_of(&self, content: &str) -> EditEffect {
        if self.ends_with_trigger(content) {
            EditEffect::OfferConversion
        } else {
            EditEffect::None
        }
    }

    /// `content` minus one trailing trigger, if it has one.
    pub fn strip_trigger<'c>(&self, content: &'c str) -> &'c str {
        content.strip_suffix(self.trigger).unwrap_or(content)
    }

    /// Patch turning `block` into `target`.
    ///
    /// A block becoming a toggle starts with an empty `children` list; a
    /// toggle converted to toggle again keeps the children it has.
    pub fn conversion_patch(&self, block: &Block, target: BlockKind) -> BlockPatch {
        let content = if target.is_textless() {
            String::new()
        } else {
            self.strip_trigger(&block.content).to_string()
        };
        let patch = BlockPatch::new().kind(target).content(content);
        match target {
            BlockKind::Todo => patch.checked(false),
            BlockKind::Toggle if block.kind == BlockKind::Toggle => patch.expanded(false),
            BlockKind::Toggle => patch.expanded(false).reset_children(),
            BlockKind::Code => patch.language(self.code_language.clone()),
            _ => patch,
        }
    }

    /// Patch removing the trigger after the menu was dismissed, or `None`
    /// when the content has no trailing trigger.
    pub fn dismissal_patch(&self, block: &Block) -> Option<BlockPatch> {
        self.ends_with_trigger(&block.content)
            .then(|| BlockPatch::new().content(self.strip_trigger(&block.content)))
    }
}

impl Default for BlockTypeTransition {
    fn default() -> Self {
        Self::new(&StoreConfig::default())
    }
}
