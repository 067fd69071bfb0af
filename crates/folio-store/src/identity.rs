//! Identifier generation for new pages and blocks.

use folio_types::{BlockId, PageId};

/// Produces identifiers for newly created entities.
///
/// Pages and blocks draw from one generator and share one id space. The
/// store skips ids that are already live in either, and gives up with
/// `StoreError::IdsExhausted` if the generator keeps repeating them.
pub trait IdGenerator: Send + Sync {
    fn next_page_id(&mut self) -> PageId;
    fn next_block_id(&mut self) -> BlockId;
}

/// Time-ordered UUIDv7 IDs. The default.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeOrderedIds;

impl IdGenerator for TimeOrderedIds {
    fn next_page_id(&mut self) -> PageId {
        PageId::new()
    }

    fn next_block_id(&mut self) -> BlockId {
        BlockId::new()
    }
}

/// Counter-backed IDs: deterministic across runs, for tests and reproducible CLI output.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    next: u128,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Start counting at `first`. Zero is skipped (it is the nil UUID).
    pub fn starting_at(first: u128) -> Self {
        Self { next: first.max(1) }
    }

    fn bump(&mut self) -> u128 {
        let v = self.next;
        self.next += 1;
        v
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIds {
    fn next_page_id(&mut self) -> PageId {
        PageId::from_u128(self.bump())
    }

    fn next_block_id(&mut self) -> BlockId {
        BlockId::from_u128(self.bump())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids_share_one_counter() {
        let mut ids = SequentialIds::new();
        let p = ids.next_page_id();
        let b = ids.next_block_id();
        let p2 = ids.next_page_id();
        assert_eq!(p, PageId::from_u128(1));
        assert_eq!(b, BlockId::from_u128(2));
        assert_eq!(p2, PageId::from_u128(3));
    }

    #[test]
    fn test_sequential_ids_skip_nil() {
        let mut ids = SequentialIds::starting_at(0);
        assert!(!ids.next_block_id().is_nil());
    }

    #[test]
    fn test_time_ordered_ids_are_unique() {
        let mut ids = TimeOrderedIds;
        let a = ids.next_block_id();
        let b = ids.next_block_id();
        assert_ne!(a, b);
    }
}
