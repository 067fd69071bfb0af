//! Shared fixtures for integration tests.

#![allow(dead_code)]

use folio_store::{FolioStore, SeedWorkspace, SequentialIds, StoreConfig};
use folio_types::{BlockId, PageId, User, UserId};

/// The demo workspace: three users, five pages, four blocks.
pub const DEMO_SEED: &str = r#"(
    name: "Kelas REY",
    users: [
        (label: "user-1", name: "Admin Rey", role: admin),
        (label: "user-2", name: "User Bob", role: member),
        (label: "user-3", name: "User Charlie", role: member),
    ],
    pages: [
        (label: "page-1", title: "Welcome Page", icon: Some("👋"), creator: "user-1",
         access: ["user-1", "user-2"], created_at: Some(1735689600000), expanded: true),
        (label: "page-2", title: "Project A", icon: Some("🚀"), creator: "user-1",
         access: ["user-1"], created_at: Some(1735776000000), expanded: true),
        (label: "page-3", title: "Task List", icon: Some("✅"), parent: Some("page-2"),
         creator: "user-1", access: ["user-1"], created_at: Some(1735862400000)),
        (label: "page-4", title: "Meeting Notes", icon: Some("📝"), parent: Some("page-2"),
         creator: "user-2", access: ["user-2", "user-1"], created_at: Some(1735948800000)),
        (label: "page-5", title: "Resources (Read-only for Bob)", icon: Some("📚"),
         creator: "user-3", access: ["user-3", "user-1"], created_at: Some(1736035200000)),
    ],
    blocks: [
        (label: "block-1", page: "page-1", kind: heading,
         content: "Welcome to your enhanced workspace!"),
        (label: "block-2", page: "page-1",
         content: "This page is editable by Admin Alice and User Bob."),
        (label: "block-8", page: "page-2", kind: heading, content: "Project Overview"),
        (label: "block-9", page: "page-2",
         content: "This page is only editable by Admin Alice."),
    ],
    selected: Some("page-1"),
)"#;

pub fn demo_store() -> FolioStore {
    demo_store_with(StoreConfig::default())
}

pub fn demo_store_with(config: StoreConfig) -> FolioStore {
    let snapshot = SeedWorkspace::from_ron(DEMO_SEED)
        .unwrap()
        .into_snapshot()
        .unwrap();
    FolioStore::from_snapshot(snapshot, config)
        .unwrap()
        .with_ids(SequentialIds::new())
}

pub fn user(store: &FolioStore, label: &str) -> User {
    store.user(UserId::from_label(label)).unwrap().clone()
}

pub fn page(label: &str) -> PageId {
    PageId::from_label(label)
}

pub fn block(label: &str) -> BlockId {
    BlockId::from_label(label)
}
