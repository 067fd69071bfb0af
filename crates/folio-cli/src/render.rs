//! Plain-text views of a workspace.
//!
//! Everything here returns lines rather than printing, so the views can be
//! asserted on in tests.

use folio_store::{CODE_LANGUAGES, EditEffect, Effect, FolioStore, MenuEntry, Outcome, Selection};
use folio_types::{Block, BlockKind, Page, User};

use crate::script::StepReport;

/// Options for [`format_tree`].
#[derive(Clone, Copy, Debug, Default)]
pub struct TreeOptions<'a> {
    /// Show each page's blocks beneath it.
    pub blocks: bool,
    /// Mark pages this user may not edit.
    pub viewer: Option<&'a User>,
}

/// Format the workspace as an ASCII tree: pages, then (optionally) blocks.
pub fn format_tree(store: &FolioStore, opts: TreeOptions<'_>) -> Vec<String> {
    let mut lines = vec![format!("{} ({})", store.workspace().name, store.workspace().id.short())];

    let roots = store.root_pages();
    for (i, page) in roots.iter().enumerate() {
        format_page(store, page, "", i + 1 == roots.len(), opts, &mut lines);
    }

    if let Selection::Template(id) = store.selection() {
        if let Some(t) = store.template(id) {
            lines.push(format!("template: {} {}", t.icon, t.name));
        }
    }
    lines
}

fn format_page(
    store: &FolioStore,
    page: &Page,
    prefix: &str,
    is_last: bool,
    opts: TreeOptions<'_>,
    lines: &mut Vec<String>,
) {
    let connector = if is_last { "└─ " } else { "├─ " };
    let children = store.child_pages(page.id);

    let fold = match (children.is_empty(), page.is_expanded) {
        (true, _) => " ",
        (false, true) => "▾",
        (false, false) => "▸",
    };
    let selected = if store.selection().page() == Some(page.id) { " *" } else { "" };
    let locked = match opts.viewer {
        Some(viewer) if !store.can_edit_page(viewer, page.id) => " 🔒",
        _ => "",
    };
    let icon = page.icon.as_deref().map(|i| format!("{i} ")).unwrap_or_default();

    lines.push(format!(
        "{prefix}{connector}{fold} {icon}{} [{}]{selected}{locked}",
        page.title,
        page.id.short()
    ));

    let child_prefix = format!("{prefix}{}", if is_last { "   " } else { "│  " });

    if opts.blocks {
        for block in store.page_blocks(page.id) {
            format_block(store, block, &format!("{child_prefix}  "), lines);
        }
    }

    for (i, child) in children.iter().enumerate() {
        format_page(store, child, &child_prefix, i + 1 == children.len(), opts, lines);
    }
}

fn format_block(store: &FolioStore, block: &Block, prefix: &str, lines: &mut Vec<String>) {
    lines.push(format!("{prefix}· {}", block_summary(block)));

    if block.kind == BlockKind::Toggle {
        let nested = format!("{prefix}  ");
        for child in store.child_blocks(block.id) {
            format_block(store, child, &nested, lines);
        }
    }
}

/// One-line rendering of a block, by kind.
pub fn block_summary(block: &Block) -> String {
    let text = format_content_summary(&block.content, 48);
    match block.kind {
        BlockKind::Text => text,
        BlockKind::Heading => format!("# {text}"),
        BlockKind::Todo => {
            let mark = if block.checked.unwrap_or(false) { "x" } else { " " };
            format!("[{mark}] {text}")
        }
        BlockKind::Image => format!("[image] {}", block.src.as_deref().unwrap_or("(none)")),
        BlockKind::Toggle => {
            let fold = if block.is_expanded.unwrap_or(false) { "▾" } else { "▸" };
            format!("{fold} {text}")
        }
        BlockKind::Divider => "---".to_string(),
        BlockKind::Code => format!("`{}` {text}", block.language.as_deref().unwrap_or("plain")),
        BlockKind::File => match &block.file {
            Some(f) => format!("[file] {} ({} bytes)", f.name, f.size),
            None => "[file] (none)".to_string(),
        },
    }
}

/// First line of `content`, truncated.
fn format_content_summary(content: &str, max_chars: usize) -> String {
    let first_line = content.lines().next().unwrap_or("");
    let trimmed = first_line.trim();

    if trimmed.chars().count() <= max_chars {
        trimmed.to_string()
    } else {
        let truncated: String = trimmed.chars().take(max_chars - 3).collect();
        format!("{truncated}...")
    }
}

/// One line per script step: who did what, and how it went.
pub fn format_report(report: &StepReport) -> String {
    let head = format!(
        "{:>3}. {:<14} {:<22}",
        report.index,
        report.actor.display_name,
        report.command.name()
    );
    match &report.outcome {
        Outcome::Applied(effect) => match describe_effect(effect) {
            Some(detail) => format!("{head} applied ({detail})"),
            None => format!("{head} applied"),
        },
        Outcome::Invalid(reason) => format!("{head} invalid: {reason}"),
        other => format!("{head} {}", other.label()),
    }
}

fn describe_effect(effect: &Effect) -> Option<String> {
    match effect {
        Effect::Done => None,
        Effect::UserAdded(id) => Some(format!("user {}", id.short())),
        Effect::PageCreated(id) => Some(format!("page {}", id.short())),
        Effect::PagesDeleted(removal) => Some(format!(
            "{} pages, {} blocks removed",
            removal.pages.len(),
            removal.blocks.len()
        )),
        Effect::BlockCreated(id) => Some(format!("block {}", id.short())),
        Effect::BlockEdited(edit) => match edit {
            EditEffect::None => None,
            EditEffect::OfferConversion => Some("conversion menu offered".into()),
        },
        Effect::BlocksDeleted(ids) => Some(format!("{} blocks removed", ids.len())),
        Effect::Expanded(open) => Some(if *open { "expanded" } else { "collapsed" }.into()),
    }
}

/// The conversion menu, with the trigger it opens on.
pub fn format_menu(trigger: char, entries: &[MenuEntry]) -> Vec<String> {
    let mut lines = vec![format!("Type '{trigger}' at the end of a block to convert it:")];
    for entry in entries {
        lines.push(format!("  {} {:<8} {:<9} {}", entry.icon, entry.label, entry.kind.as_str(), entry.description));
    }
    lines.push(String::new());
    lines.push("Code languages:".to_string());
    for (value, label) in CODE_LANGUAGES.iter() {
        lines.push(format!("  {value:<12} {label}"));
    }
    lines
}

// ============================================================================
// Tests
// ============================================================================
