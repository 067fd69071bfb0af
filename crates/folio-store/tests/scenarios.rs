//! End-to-end behavior of the store against the demo workspace.

mod common;

use common::{block, demo_store, demo_store_with, page, user};
use folio_store::{
    Command, Effect, EditEffect, InvalidReason, Outcome, Selection, StoreConfig, StoreError,
    ToggleCascade,
};
use folio_types::{BlockId, BlockKind, BlockPatch, PageId, Role};

fn toggle_with_children(
    store: &mut folio_store::FolioStore,
    on: PageId,
    n: usize,
) -> (BlockId, Vec<BlockId>) {
    let admin = user(store, "user-1");
    let toggle = store.add_block(&admin, on, None, None).unwrap();
    store
        .convert_block(&admin, toggle, BlockKind::Toggle)
        .unwrap();
    let children = (0..n)
        .map(|_| store.add_block(&admin, on, None, Some(toggle)).unwrap())
        .collect();
    (toggle, children)
}

// ============================================================================
// Access
// ============================================================================

#[test]
fn test_demo_access_matrix() {
    let store = demo_store();
    let admin = user(&store, "user-1");
    let bob = user(&store, "user-2");
    let charlie = user(&store, "user-3");

    for label in ["page-1", "page-2", "page-3", "page-4", "page-5"] {
        assert!(store.can_edit_page(&admin, page(label)), "admin on {label}");
    }
    assert!(store.can_edit_page(&bob, page("page-1")));
    assert!(!store.can_edit_page(&bob, page("page-2")));
    assert!(store.can_edit_page(&bob, page("page-4")));
    assert!(!store.can_edit_page(&bob, page("page-5")));
    assert!(store.can_edit_page(&charlie, page("page-5")));
    assert!(!store.can_edit_page(&charlie, page("page-1")));
    assert!(!store.can_edit_page(&admin, PageId::new()));
}

#[test]
fn test_non_member_block_update_is_denied_and_changes_nothing() {
    let mut store = demo_store();
    let admin = user(&store, "user-1");
    let bob = user(&store, "user-2");

    let private = store.add_page(&admin, None).unwrap();
    let target = store.page_blocks(private)[0].id;
    let before = store.snapshot();

    let err = store
        .update_block(&bob, target, &BlockPatch::new().content("mine"))
        .unwrap_err();
    assert!(err.is_denied());
    assert_eq!(store.snapshot(), before);
}

#[test]
fn test_bob_can_edit_welcome_but_not_project() {
    let mut store = demo_store();
    let bob = user(&store, "user-2");

    store
        .update_block(&bob, block("block-2"), &BlockPatch::new().content("Bob was here"))
        .unwrap();
    assert_eq!(store.block(block("block-2")).unwrap().content, "Bob was here");

    let outcome = store.execute(
        &bob,
        Command::UpdateBlock {
            block: block("block-9"),
            patch: BlockPatch::new().content("nope"),
        },
    );
    assert_eq!(outcome, Outcome::Denied);
}

#[test]
fn test_creator_cannot_be_removed_from_access() {
    let mut store = demo_store();
    let admin = user(&store, "user-1");
    let bob = user(&store, "user-2");
    let notes = page("page-4");
    let before = store.page(notes).unwrap().access.clone();

    let err = store.update_page_access(&admin, notes, &[admin.id]).unwrap_err();
    assert_eq!(
        err,
        StoreError::Invalid(InvalidReason::CreatorRemoved {
            page: notes,
            creator: bob.id,
        })
    );
    assert!(store.revoke_access(&admin, notes, bob.id).is_err());
    assert_eq!(store.page(notes).unwrap().access, before);
}

#[test]
fn test_grant_then_revoke_round_trip() {
    let mut store = demo_store();
    let admin = user(&store, "user-1");
    let charlie = user(&store, "user-3");
    let project = page("page-2");

    assert!(store.update_page_title(&charlie, project, "Mine").unwrap_err().is_denied());
    store.grant_access(&admin, project, charlie.id).unwrap();
    store.update_page_title(&charlie, project, "Shared Project").unwrap();
    store.revoke_access(&admin, project, charlie.id).unwrap();
    assert!(!store.can_edit_page(&charlie, project));
    assert_eq!(store.page(project).unwrap().title, "Shared Project");
}

#[test]
fn test_add_page_under_unknown_parent_is_denied() {
    let mut store = demo_store();
    let admin = user(&store, "user-1");
    let outcome = store.execute(
        &admin,
        Command::AddPage {
            parent: Some(PageId::new()),
        },
    );
    assert_eq!(outcome, Outcome::Denied);
    assert_eq!(store.pages().count(), 5);
}

#[test]
fn test_member_adds_subpage_where_granted() {
    let mut store = demo_store();
    let bob = user(&store, "user-2");
    let sub = store.add_page(&bob, Some(page("page-4"))).unwrap();
    let created = store.page(sub).unwrap();
    assert_eq!(created.creator_id, bob.id);
    assert_eq!(created.access, vec![bob.id]);
    assert_eq!(store.ancestry(sub).len(), 3);
    assert!(store.page(page("page-4")).unwrap().is_expanded);
    assert_eq!(store.selection(), Selection::Page(sub));
}

// ============================================================================
// Page deletion
// ============================================================================

#[test]
fn test_delete_page_removes_subtree_and_blocks() {
    let mut store = demo_store();
    let admin = user(&store, "user-1");
    let project = page("page-2");
    let deep = store.add_page(&admin, Some(page("page-3"))).unwrap();
    store
        .add_block(&admin, page("page-4"), None, None)
        .unwrap();

    let removal = store.delete_page(&admin, project).unwrap();

    let mut removed = removal.pages.clone();
    removed.sort();
    let mut expected = vec![project, page("page-3"), page("page-4"), deep];
    expected.sort();
    assert_eq!(removed, expected);

    assert!(removal.blocks.contains(&block("block-8")));
    assert!(removal.blocks.contains(&block("block-9")));
    for id in &removal.pages {
        assert!(store.page(*id).is_none());
        assert!(store.blocks().all(|b| b.page_id != *id));
    }
    assert!(store.page(page("page-1")).is_some());
    assert!(store.block(block("block-1")).is_some());
    store.check_invariants().unwrap();
}

#[test]
fn test_delete_page_denied_for_member() {
    let mut store = demo_store();
    let bob = user(&store, "user-2");
    let before = store.snapshot();
    assert!(store.delete_page(&bob, page("page-5")).unwrap_err().is_denied());
    assert_eq!(store.snapshot(), before);
}

#[test]
fn test_delete_missing_page_is_not_found() {
    let mut store = demo_store();
    let admin = user(&store, "user-1");
    let outcome = store.execute(
        &admin,
        Command::DeletePage {
            page: PageId::new(),
        },
    );
    assert_eq!(outcome, Outcome::NotFound);
}

#[test]
fn test_deleting_selected_page_falls_back_to_first() {
    let mut store = demo_store();
    let admin = user(&store, "user-1");
    assert_eq!(store.selection(), Selection::Page(page("page-1")));
    store.delete_page(&admin, page("page-1")).unwrap();
    assert_eq!(store.selection(), Selection::Page(page("page-2")));
}

// ============================================================================
// Blocks
// ============================================================================

#[test]
fn test_add_block_after_lands_directly_behind() {
    let mut store = demo_store();
    let admin = user(&store, "user-1");
    let welcome = page("page-1");

    let new = store
        .add_block(&admin, welcome, Some(block("block-1")), None)
        .unwrap();

    let global: Vec<BlockId> = store.blocks().map(|b| b.id).collect();
    let at = global.iter().position(|id| *id == block("block-1")).unwrap();
    assert_eq!(global[at + 1], new);

    let roots: Vec<BlockId> = store.page_blocks(welcome).iter().map(|b| b.id).collect();
    assert_eq!(roots, vec![block("block-1"), new, block("block-2")]);
}

#[test]
fn test_add_block_after_missing_block_is_not_found() {
    let mut store = demo_store();
    let admin = user(&store, "user-1");
    let before = store.block_count();
    let err = store
        .add_block(&admin, page("page-1"), Some(BlockId::new()), None)
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(store.block_count(), before);
}

#[test]
fn test_toggle_delete_takes_children() {
    let mut store = demo_store();
    let admin = user(&store, "user-1");
    let (toggle, children) = toggle_with_children(&mut store, page("page-1"), 2);
    assert_eq!(store.block(toggle).unwrap().child_ids(), children.as_slice());

    let removed = store.delete_block(&admin, toggle).unwrap();
    assert_eq!(removed, vec![toggle, children[0], children[1]]);
    assert!(store.blocks().all(|b| b.parent_block_id != Some(toggle)));
    assert!(children.iter().all(|c| store.block(*c).is_none()));
}

#[test]
fn test_toggle_delete_one_level_leaves_grandchildren() {
    let mut store = demo_store();
    let admin = user(&store, "user-1");
    let welcome = page("page-1");
    let (outer, inner) = toggle_with_children(&mut store, welcome, 1);
    store
        .convert_block(&admin, inner[0], BlockKind::Toggle)
        .unwrap();
    let grandchild = store
        .add_block(&admin, welcome, None, Some(inner[0]))
        .unwrap();

    store.delete_block(&admin, outer).unwrap();
    assert!(store.block(grandchild).is_some());
    assert_eq!(store.block_store().orphans()[0].id, grandchild);
    store.check_invariants().unwrap();
}

#[test]
fn test_toggle_delete_recursive_config() {
    let config = StoreConfig::default().with_toggle_cascade(ToggleCascade::Recursive);
    let mut store = demo_store_with(config);
    let admin = user(&store, "user-1");
    let welcome = page("page-1");
    let (outer, inner) = toggle_with_children(&mut store, welcome, 1);
    store
        .convert_block(&admin, inner[0], BlockKind::Toggle)
        .unwrap();
    let grandchild = store
        .add_block(&admin, welcome, None, Some(inner[0]))
        .unwrap();

    let removed = store.delete_block(&admin, outer).unwrap();
    assert_eq!(removed, vec![outer, inner[0], grandchild]);
    assert!(store.block_store().orphans().is_empty());
}

#[test]
fn test_deleting_child_updates_toggle_list() {
    let mut store = demo_store();
    let admin = user(&store, "user-1");
    let (toggle, children) = toggle_with_children(&mut store, page("page-1"), 3);
    store.delete_block(&admin, children[1]).unwrap();
    assert_eq!(
        store.block(toggle).unwrap().child_ids(),
        &[children[0], children[2]]
    );
    let listed: Vec<BlockId> = store.child_blocks(toggle).iter().map(|b| b.id).collect();
    assert_eq!(listed, vec![children[0], children[2]]);
    assert!(store.block_store().mismatched_toggles().is_empty());
}

#[test]
fn test_nesting_under_text_block_is_invalid() {
    let mut store = demo_store();
    let admin = user(&store, "user-1");
    let err = store
        .add_block(&admin, page("page-1"), None, Some(block("block-2")))
        .unwrap_err();
    assert_eq!(
        err,
        StoreError::Invalid(InvalidReason::ParentNotToggle(block("block-2")))
    );
}

#[test]
fn test_toggle_block_expansion_twice_restores() {
    let mut store = demo_store();
    let admin = user(&store, "user-1");
    let (toggle, _) = toggle_with_children(&mut store, page("page-1"), 0);
    assert_eq!(store.block(toggle).unwrap().is_expanded, Some(false));
    assert!(store.toggle_block_expansion(&admin, toggle).unwrap());
    assert!(!store.toggle_block_expansion(&admin, toggle).unwrap());
}

#[test]
fn test_toggle_page_expansion_twice_restores() {
    let mut store = demo_store();
    let project = page("page-2");
    let before = store.page(project).unwrap().is_expanded;
    store.toggle_page_expansion(project).unwrap();
    store.toggle_page_expansion(project).unwrap();
    assert_eq!(store.page(project).unwrap().is_expanded, before);
}

// ============================================================================
// Type conversion
// ============================================================================

#[test]
fn test_slash_then_convert_to_todo() {
    let mut store = demo_store();
    let admin = user(&store, "user-1");
    let id = store.add_block(&admin, page("page-1"), None, None).unwrap();

    let edited = store.execute(
        &admin,
        Command::UpdateBlock {
            block: id,
            patch: BlockPatch::new().content("hello/"),
        },
    );
    assert_eq!(
        edited,
        Outcome::Applied(Effect::BlockEdited(EditEffect::OfferConversion))
    );

    let converted = store.execute(
        &admin,
        Command::ConvertBlock {
            block: id,
            kind: BlockKind::Todo,
        },
    );
    assert!(converted.is_applied());

    let b = store.block(id).unwrap();
    assert_eq!(b.kind, BlockKind::Todo);
    assert_eq!(b.content, "hello");
    assert_eq!(b.checked, Some(false));
}

#[test]
fn test_conversion_regated_after_access_revoked() {
    let mut store = demo_store();
    let admin = user(&store, "user-1");
    let bob = user(&store, "user-2");
    let welcome = page("page-1");

    store
        .update_block(&bob, block("block-2"), &BlockPatch::new().content("menu/"))
        .unwrap();
    store.revoke_access(&admin, welcome, bob.id).unwrap();

    let err = store
        .convert_block(&bob, block("block-2"), BlockKind::Heading)
        .unwrap_err();
    assert!(err.is_denied());
    assert_eq!(store.block(block("block-2")).unwrap().kind, BlockKind::Text);
}

#[test]
fn test_convert_to_code_and_divider() {
    let mut store = demo_store_with(StoreConfig::default().with_code_language("python"));
    let admin = user(&store, "user-1");
    store
        .convert_block(&admin, block("block-9"), BlockKind::Code)
        .unwrap();
    let code = store.block(block("block-9")).unwrap();
    assert_eq!(code.language.as_deref(), Some("python"));
    assert_eq!(code.content, "This page is only editable by Admin Alice.");

    store
        .convert_block(&admin, block("block-8"), BlockKind::Divider)
        .unwrap();
    assert!(store.block(block("block-8")).unwrap().content.is_empty());
}

#[test]
fn test_converting_toggle_away_keeps_nested_blocks_visible() {
    let mut store = demo_store();
    let admin = user(&store, "user-1");
    let welcome = page("page-1");
    let (toggle, children) = toggle_with_children(&mut store, welcome, 2);

    store
        .convert_block(&admin, toggle, BlockKind::Toggle)
        .unwrap();
    assert_eq!(store.block(toggle).unwrap().child_ids(), children.as_slice());

    store
        .convert_block(&admin, toggle, BlockKind::Heading)
        .unwrap();
    let roots: Vec<BlockId> = store.page_blocks(welcome).iter().map(|b| b.id).collect();
    assert!(children.iter().all(|c| roots.contains(c)));
    assert!(store.orphans().is_empty());
    store.check_invariants().unwrap();
}

#[test]
fn test_conversion_menu_is_complete() {
    let store = demo_store();
    let menu = store.conversion_menu();
    assert_eq!(menu.len(), 8);
    for kind in BlockKind::ALL {
        assert!(menu.iter().any(|e| e.kind == kind), "{kind} missing");
    }
}

// ============================================================================
// Workspace, users, navigation
// ============================================================================

#[test]
fn test_workspace_rename_and_user_admin() {
    let mut store = demo_store();
    let admin = user(&store, "user-1");
    let bob = user(&store, "user-2");

    assert_eq!(store.workspace().name, "Kelas REY");
    assert_eq!(
        store.execute(&bob, Command::RenameWorkspace { name: "Bob's".into() }),
        Outcome::Denied
    );
    store.rename_workspace(&admin, "Kelas Baru").unwrap();
    assert_eq!(store.workspace().name, "Kelas Baru");

    let dana = store.add_user(&admin, "Dana", Role::Member).unwrap();
    store.grant_access(&admin, page("page-5"), dana).unwrap();
    assert!(store.add_user(&bob, "Eve", Role::Admin).unwrap_err().is_denied());
    assert_eq!(store.users().len(), 4);
}

#[test]
fn test_select_template_clears_page() {
    let mut store = demo_store();
    let admin = user(&store, "user-1");
    let calendar = store.templates()[1].id;
    let outcome = store.execute(&admin, Command::SelectTemplate { template: calendar });
    assert!(outcome.is_applied());
    assert_eq!(store.selection(), Selection::Template(calendar));
    assert!(store.selected_page().is_none());
}
