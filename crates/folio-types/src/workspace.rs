//! Workspace and template metadata.
//!
//! The workspace is the single top-level container for all pages. Templates
//! are selectable alongside pages but carry no page tree of their own; their
//! contents (roadmap tasks, calendar events) live outside this model.

use serde::{Deserialize, Serialize};

use crate::ids::{TemplateId, WorkspaceId};

/// The top-level named container.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: WorkspaceId,
    /// Human-friendly name. Only admins may change it.
    pub name: String,
}

impl Workspace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: WorkspaceId::new(),
            name: name.into(),
        }
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new("Workspace")
    }
}

/// Which flat list a template presents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Roadmap,
    Calendar,
}

/// A built-in template entry in the navigation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    pub name: String,
    pub icon: String,
    pub description: String,
    pub kind: TemplateKind,
}

impl Template {
    /// The two built-in templates, with stable IDs.
    pub fn builtin() -> Vec<Template> {
        vec![
            Template {
                id: TemplateId::from_label("template-roadmap"),
                name: "Roadmap".into(),
                icon: "🗺️".into(),
                description: "Plan and track project milestones".into(),
                kind: TemplateKind::Roadmap,
            },
            Template {
                id: TemplateId::from_label("template-calendar"),
                name: "Calendar".into(),
                icon: "📅".into(),
                description: "Organize events and deadlines".into(),
                kind: TemplateKind::Calendar,
            },
        ]
    }
}
