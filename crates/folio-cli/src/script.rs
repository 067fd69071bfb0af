//! Command scripts.
//!
//! A script is a RON list of steps. Each step names a command the way
//! [`folio_store::Command`] does, except entities are referred to by label:
//! seed labels (`"page-2"`), labels bound by earlier steps (`bind:`), or full
//! UUIDs. Users may also be named by display name.
//!
//! ```ron
//! [
//!     (command: AddPage(parent: Some("page-4")), bind: Some("standup")),
//!     (actor: Some("user-1"), command: GrantAccess(page: "standup", user: "user-3")),
//! ]
//! ```

use std::collections::HashMap;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::debug;

use folio_store::{Command, Effect, FolioStore, Outcome};
use folio_types::{BlockId, BlockKind, BlockPatch, PageId, Role, TemplateId, User, UserId};

/// One line of a script.
#[derive(Clone, Debug, Deserialize)]
pub struct Step {
    /// Who runs this step; defaults to the script's actor.
    #[serde(default)]
    pub actor: Option<String>,
    pub command: ScriptCommand,
    /// Label for the page, block or user this step creates.
    #[serde(default)]
    pub bind: Option<String>,
}

/// [`Command`] with label references.
#[derive(Clone, Debug, Deserialize)]
pub enum ScriptCommand {
    RenameWorkspace { name: String },
    AddUser {
        name: String,
        #[serde(default)]
        role: Role,
    },
    AddPage {
        #[serde(default)]
        parent: Option<String>,
    },
    DeletePage { page: String },
    UpdatePageTitle { page: String, title: String },
    UpdatePageIcon {
        page: String,
        #[serde(default)]
        icon: Option<String>,
    },
    UpdatePageAccess { page: String, users: Vec<String> },
    GrantAccess { page: String, user: String },
    RevokeAccess { page: String, user: String },
    TogglePageExpansion { page: String },
    SelectPage { page: String },
    SelectTemplate { template: String },
    AddBlock {
        page: String,
        #[serde(default)]
        after: Option<String>,
        #[serde(default)]
        parent: Option<String>,
    },
    UpdateBlock { block: String, patch: BlockPatch },
    DeleteBlock { block: String },
    ToggleBlockExpansion { block: String },
    ConvertBlock { block: String, kind: BlockKind },
    DismissConversion { block: String },
}

pub fn parse(text: &str) -> Result<Vec<Step>> {
    ron::from_str(text).context("parsing script")
}

/// Labels bound while a script runs.
#[derive(Debug, Default)]
pub struct Labels {
    pages: HashMap<String, PageId>,
    blocks: HashMap<String, BlockId>,
    users: HashMap<String, UserId>,
}

impl Labels {
    /// Bound label, else UUID text, else the seed label derivation.
    /// Unknown names resolve to ids that simply do not exist.
    fn page(&self, label: &str) -> PageId {
        self.pages
            .get(label)
            .copied()
            .or_else(|| PageId::parse(label).ok())
            .unwrap_or_else(|| PageId::from_label(label))
    }

    fn block(&self, label: &str) -> BlockId {
        self.blocks
            .get(label)
            .copied()
            .or_else(|| BlockId::parse(label).ok())
            .unwrap_or_else(|| BlockId::from_label(label))
    }

    fn user(&self, store: &FolioStore, name: &str) -> UserId {
        self.users
            .get(name)
            .copied()
            .or_else(|| store.users().lookup(name).ok().map(|u| u.id))
            .unwrap_or_else(|| UserId::from_label(name))
    }

    fn template(&self, store: &FolioStore, name: &str) -> TemplateId {
        store
            .templates()
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
            .map(|t| t.id)
            .unwrap_or_else(|| TemplateId::from_label(name))
    }

    fn bind(&mut self, label: String, effect: &Effect) {
        match effect {
            Effect::PageCreated(id) => {
                self.pages.insert(label, *id);
            }
            Effect::BlockCreated(id) => {
                self.blocks.insert(label, *id);
            }
            Effect::UserAdded(id) => {
                self.users.insert(label, *id);
            }
            other => debug!(%label, effect = ?other, "nothing to bind"),
        }
    }

    /// Turn a script command into a store command.
    pub fn resolve(&self, store: &FolioStore, command: &ScriptCommand) -> Command {
        match command {
            ScriptCommand::RenameWorkspace { name } => Command::RenameWorkspace { name: name.clone() },
            ScriptCommand::AddUser { name, role } => Command::AddUser {
                display_name: name.clone(),
                role: *role,
            },
            ScriptCommand::AddPage { parent } => Command::AddPage {
                parent: parent.as_deref().map(|p| self.page(p)),
            },
            ScriptCommand::DeletePage { page } => Command::DeletePage {
                page: self.page(page),
            },
            ScriptCommand::UpdatePageTitle { page, title } => Command::UpdatePageTitle {
                page: self.page(page),
                title: title.clone(),
            },
            ScriptCommand::UpdatePageIcon { page, icon } => Command::UpdatePageIcon {
                page: self.page(page),
                icon: icon.clone(),
            },
            ScriptCommand::UpdatePageAccess { page, users } => Command::UpdatePageAccess {
                page: self.page(page),
                users: users.iter().map(|u| self.user(store, u)).collect(),
            },
            ScriptCommand::GrantAccess { page, user } => Command::GrantAccess {
                page: self.page(page),
                user: self.user(store, user),
            },
            ScriptCommand::RevokeAccess { page, user } => Command::RevokeAccess {
                page: self.page(page),
                user: self.user(store, user),
            },
            ScriptCommand::TogglePageExpansion { page } => Command::TogglePageExpansion {
                page: self.page(page),
            },
            ScriptCommand::SelectPage { page } => Command::SelectPage {
                page: self.page(page),
            },
            ScriptCommand::SelectTemplate { template } => Command::SelectTemplate {
                template: self.template(store, template),
            },
            ScriptCommand::AddBlock {
                page,
                after,
                parent,
            } => Command::AddBlock {
                page: self.page(page),
                after: after.as_deref().map(|b| self.block(b)),
                parent: parent.as_deref().map(|b| self.block(b)),
            },
            ScriptCommand::UpdateBlock { block, patch } => Command::UpdateBlock {
                block: self.block(block),
                patch: patch.clone(),
            },
            ScriptCommand::DeleteBlock { block } => Command::DeleteBlock {
                block: self.block(block),
            },
            ScriptCommand::ToggleBlockExpansion { block } => Command::ToggleBlockExpansion {
                block: self.block(block),
            },
            ScriptCommand::ConvertBlock { block, kind } => Command::ConvertBlock {
                block: self.block(block),
                kind: *kind,
            },
            ScriptCommand::DismissConversion { block } => Command::DismissConversion {
                block: self.block(block),
            },
        }
    }
}

/// What one step did.
#[derive(Debug)]
pub struct StepReport {
    pub index: usize,
    pub actor: User,
    pub command: Command,
    pub outcome: Outcome<Effect>,
}

/// Run every step in order. Refused or invalid steps are reported, not fatal;
/// only an unknown step actor stops the script.
pub fn run(store: &mut FolioStore, default_actor: &User, steps: Vec<Step>) -> Result<Vec<StepReport>> {
    let mut labels = Labels::default();
    let mut reports = Vec::with_capacity(steps.len());

    for (index, step) in steps.into_iter().enumerate() {
        let actor = match &step.actor {
            Some(name) => match store.users().lookup(name) {
                Ok(user) => user.clone(),
                Err(_) => bail!("step {}: unknown actor '{name}'", index + 1),
            },
            None => default_actor.clone(),
        };
        let command = labels.resolve(store, &step.command);
        let outcome = store.execute(&actor, command.clone());
        if let (Some(label), Outcome::Applied(effect)) = (step.bind, &outcome) {
            labels.bind(label, effect);
        }
        reports.push(StepReport {
            index: index + 1,
            actor,
            command,
            outcome,
        });
    }
    Ok(reports)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Source, open_store};
    use folio_store::StoreConfig;

    fn demo() -> FolioStore {
        open_store(&Source::Demo, StoreConfig::default(), true).unwrap()
    }

    fn bob(store: &FolioStore) -> User {
        store.users().lookup("user-2").unwrap().clone()
    }

    #[test]
    fn test_demo_script_parses_and_runs() {
        let mut store = demo();
        let actor = bob(&store);
        let steps = parse(include_str!("../demos/script.ron")).unwrap();
        let reports = run(&mut store, &actor, steps).unwrap();

        let labels: Vec<&str> = reports.iter().map(|r| r.outcome.label()).collect();
        assert_eq!(labels[0], "applied");
        assert_eq!(labels[2], "denied");
        assert!(labels.contains(&"invalid"));
        store.check_invariants().unwrap();
    }

    #[test]
    fn test_bind_threads_created_ids() {
        let mut store = demo();
        let actor = bob(&store);
        let steps = parse(
            r#"[
                (command: AddPage(parent: Some("page-4")), bind: Some("sub")),
                (command: UpdatePageTitle(page: "sub", title: "Bound")),
                (command: AddBlock(page: "sub", after: None, parent: None), bind: Some("b")),
                (command: UpdateBlock(block: "b", patch: (content: Some("hi")))),
            ]"#,
        )
        .unwrap();
        let reports = run(&mut store, &actor, steps).unwrap();
        assert!(reports.iter().all(|r| r.outcome.is_applied()));
        let page = store.pages().find(|p| p.title == "Bound").unwrap();
        assert!(store.page_blocks(page.id).iter().any(|b| b.content == "hi"));
    }

    #[test]
    fn test_step_actor_override_and_unknown_actor() {
        let mut store = demo();
        let actor = bob(&store);
        let steps = parse(
            r#"[(actor: Some("Admin Rey"), command: UpdatePageTitle(page: "page-2", title: "Renamed"))]"#,
        )
        .unwrap();
        let reports = run(&mut store, &actor, steps).unwrap();
        assert!(reports[0].outcome.is_applied());
        assert!(reports[0].actor.is_admin());

        let steps = parse(r#"[(actor: Some("nobody"), command: SelectPage(page: "page-1"))]"#).unwrap();
        assert!(run(&mut store, &actor, steps).is_err());
    }

    #[test]
    fn test_unknown_labels_report_not_found() {
        let mut store = demo();
        let actor = bob(&store);
        let steps = parse(r#"[(command: DeleteBlock(block: "block-404"))]"#).unwrap();
        let reports = run(&mut store, &actor, steps).unwrap();
        assert_eq!(reports[0].outcome, Outcome::NotFound);
    }

    #[test]
    fn test_template_by_name() {
        let mut store = demo();
        let actor = bob(&store);
        let steps = parse(r#"[(command: SelectTemplate(template: "calendar"))]"#).unwrap();
        let reports = run(&mut store, &actor, steps).unwrap();
        assert!(reports[0].outcome.is_applied());
        assert!(store.selection().template().is_some());
    }
}
