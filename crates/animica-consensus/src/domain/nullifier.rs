//! # Nullifier Store
//!
//! Append-only set of accepted proof nullifiers with height-denominated
//! TTL. Insertion is atomic per block: the whole batch goes in or none of
//! it, and removal (reorg rewind) restores the exact prior state.

use crate::domain::error::StoreError;
use shared_types::Nullifier;
use std::collections::HashMap;

/// In-memory nullifier set; the canonical store semantics behind the
/// chain-store hook.
#[derive(Clone, Debug, Default)]
pub struct NullifierStore {
    /// Digest → insertion height.
    entries: HashMap<Nullifier, u64>,
}

impl NullifierStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a nullifier is active.
    pub fn contains(&self, nullifier: &Nullifier) -> bool {
        self.entries.contains_key(nullifier)
    }

    /// Active entry count.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert one block's nullifiers at `height`, atomically.
    ///
    /// The whole batch is checked before anything mutates, so a rejection
    /// leaves the store untouched.
    pub fn insert_block(
        &mut self,
        nullifiers: &[Nullifier],
        height: u64,
    ) -> Result<(), StoreError> {
        for nullifier in nullifiers {
            if self.entries.contains_key(nullifier) {
                return Err(StoreError::NullifierReuse(*nullifier));
            }
        }
        for nullifier in nullifiers {
            self.entries.insert(*nullifier, height);
        }
        Ok(())
    }

    /// Remove one block's nullifiers (reorg rewind).
    pub fn remove_block(&mut self, nullifiers: &[Nullifier]) {
        for nullifier in nullifiers {
            self.entries.remove(nullifier);
        }
    }

    /// Drop entries whose TTL elapsed at `up_to_height`.
    ///
    /// Returns how many entries were evicted.
    pub fn evict_expired(&mut self, up_to_height: u64, ttl: u64) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, inserted| inserted.saturating_add(ttl) > up_to_height);
        before - self.entries.len()
    }

    /// Insertion height of an active nullifier.
    pub fn inserted_at(&self, nullifier: &Nullifier) -> Option<u64> {
        self.entries.get(nullifier).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(tag: u8) -> Nullifier {
        [tag; 32]
    }

    #[test]
    fn test_insert_and_contains() {
        let mut store = NullifierStore::new();
        store.insert_block(&[n(1), n(2)], 10).unwrap();
        assert!(store.contains(&n(1)));
        assert!(store.contains(&n(2)));
        assert!(!store.contains(&n(3)));
        assert_eq!(store.inserted_at(&n(1)), Some(10));
    }

    #[test]
    fn test_reuse_rejected() {
        let mut store = NullifierStore::new();
        store.insert_block(&[n(1)], 10).unwrap();
        assert_eq!(
            store.insert_block(&[n(2), n(1)], 11).unwrap_err(),
            StoreError::NullifierReuse(n(1))
        );
    }

    #[test]
    fn test_rejected_batch_leaves_store_unchanged() {
        let mut store = NullifierStore::new();
        store.insert_block(&[n(1)], 10).unwrap();
        let _ = store.insert_block(&[n(2), n(3), n(1)], 11);
        assert!(!store.contains(&n(2)));
        assert!(!store.contains(&n(3)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_apply_then_revert_is_identity() {
        let mut store = NullifierStore::new();
        store.insert_block(&[n(1)], 5).unwrap();
        let snapshot = store.clone();

        store.insert_block(&[n(2), n(3)], 6).unwrap();
        store.remove_block(&[n(2), n(3)]);

        assert_eq!(store.len(), snapshot.len());
        assert!(store.contains(&n(1)));
        assert!(!store.contains(&n(2)));
    }

    #[test]
    fn test_ttl_eviction() {
        let mut store = NullifierStore::new();
        store.insert_block(&[n(1)], 0).unwrap();
        store.insert_block(&[n(2)], 50).unwrap();
        let evicted = store.evict_expired(100, 100);
        assert_eq!(evicted, 1);
        assert!(!store.contains(&n(1)));
        assert!(store.contains(&n(2)));
        // An evicted nullifier may enter again; its epoch moved anyway.
        store.insert_block(&[n(1)], 101).unwrap();
    }
}
