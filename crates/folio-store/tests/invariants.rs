//! Randomized command sequences against the demo workspace.
//!
//! Fixed seeds keep failures reproducible. After every command the structural
//! invariants must hold, and a command that was not applied must leave the
//! store exactly as it found it.

mod common;

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use common::{demo_store, demo_store_with};
use folio_store::{Command, FolioStore, StoreConfig, ToggleCascade};
use folio_types::{BlockId, BlockKind, BlockPatch, PageId, User};

fn random_command(rng: &mut StdRng, store: &FolioStore) -> Command {
    let pages: Vec<PageId> = store.pages().map(|p| p.id).collect();
    let blocks: Vec<BlockId> = store.blocks().map(|b| b.id).collect();
    let users: Vec<User> = store.users().iter().cloned().collect();

    let some_page = |rng: &mut StdRng| -> PageId {
        if rng.gen_bool(0.1) {
            PageId::new()
        } else {
            pages.choose(rng).copied().unwrap_or_else(PageId::new)
        }
    };
    let some_block = |rng: &mut StdRng| -> BlockId {
        if rng.gen_bool(0.1) {
            BlockId::new()
        } else {
            blocks.choose(rng).copied().unwrap_or_else(BlockId::new)
        }
    };

    match rng.gen_range(0..14) {
        0 => Command::AddPage {
            parent: rng.gen_bool(0.7).then(|| some_page(rng)),
        },
        1 => Command::DeletePage {
            page: some_page(rng),
        },
        2 => Command::UpdatePageTitle {
            page: some_page(rng),
            title: if rng.gen_bool(0.2) { "  ".into() } else { "Renamed".into() },
        },
        3 => Command::GrantAccess {
            page: some_page(rng),
            user: users.choose(rng).map(|u| u.id).unwrap_or_default(),
        },
        4 => Command::RevokeAccess {
            page: some_page(rng),
            user: users.choose(rng).map(|u| u.id).unwrap_or_default(),
        },
        5 => Command::TogglePageExpansion {
            page: some_page(rng),
        },
        6 | 7 => Command::AddBlock {
            page: some_page(rng),
            after: rng.gen_bool(0.5).then(|| some_block(rng)),
            parent: rng.gen_bool(0.3).then(|| some_block(rng)),
        },
        8 => Command::UpdateBlock {
            block: some_block(rng),
            patch: BlockPatch::new().content(if rng.gen_bool(0.5) { "text/" } else { "text" }),
        },
        9 | 10 => Command::ConvertBlock {
            block: some_block(rng),
            kind: *BlockKind::ALL.choose(rng).unwrap_or(&BlockKind::Toggle),
        },
        11 => Command::DeleteBlock {
            block: some_block(rng),
        },
        12 => Command::ToggleBlockExpansion {
            block: some_block(rng),
        },
        _ => Command::DismissConversion {
            block: some_block(rng),
        },
    }
}

fn orphan_ids(store: &FolioStore) -> HashSet<BlockId> {
    store.orphans().iter().map(|b| b.id).collect()
}

fn run(seed: u64, mut store: FolioStore, steps: usize) {
    let mut rng = StdRng::seed_from_u64(seed);
    let users: Vec<User> = store.users().iter().cloned().collect();
    let cascade = store.config().toggle_cascade;

    for step in 0..steps {
        let actor = users.choose(&mut rng).unwrap().clone();
        let command = random_command(&mut rng, &store);
        let before = store.snapshot();
        let orphans_before = orphan_ids(&store);
        let outcome = store.execute(&actor, command.clone());

        if !outcome.is_applied() {
            assert_eq!(
                store.snapshot(),
                before,
                "seed {seed} step {step}: {command:?} ({}) changed the store",
                outcome.label()
            );
        }
        if let Err(e) = store.check_invariants() {
            panic!("seed {seed} step {step}: {command:?} broke an invariant: {e}");
        }
        for page in store.pages() {
            assert!(page.access.contains(&page.creator_id));
        }
        for block in store.blocks() {
            assert!(store.page(block.page_id).is_some());
        }
        assert!(
            store.block_store().mismatched_toggles().is_empty(),
            "seed {seed} step {step}: {command:?} left a toggle's children out of step"
        );

        // Only a one-level toggle delete may leave blocks behind.
        let orphans = orphan_ids(&store);
        let deleted_toggle = outcome.is_applied() && matches!(command, Command::DeleteBlock { .. });
        if cascade == ToggleCascade::Recursive || !deleted_toggle {
            assert!(
                orphans.is_subset(&orphans_before),
                "seed {seed} step {step}: {command:?} orphaned blocks"
            );
        }
    }

    let reloaded = FolioStore::from_snapshot(store.snapshot(), store.config().clone())
        .unwrap_or_else(|e| panic!("seed {seed}: final snapshot does not reload: {e}"));
    assert_eq!(reloaded.snapshot(), store.snapshot());
}

#[test]
fn test_random_commands_keep_invariants() {
    for seed in 0..8 {
        run(seed, demo_store(), 250);
    }
}

#[test]
fn test_random_commands_keep_invariants_recursive_cascade() {
    let config = StoreConfig::default().with_toggle_cascade(ToggleCascade::Recursive);
    for seed in 100..104 {
        run(seed, demo_store_with(config.clone()), 250);
    }
}
