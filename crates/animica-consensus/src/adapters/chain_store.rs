//! In-memory chain store adapter.

use crate::domain::{NullifierStore, StoreError, ThetaState};
use crate::ports::ChainStore;
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{BlockHeader, Hash, Nullifier};
use std::collections::{BTreeMap, HashMap};

#[derive(Default)]
struct Inner {
    headers: HashMap<Hash, BlockHeader>,
    canonical_by_height: BTreeMap<u64, Hash>,
    nullifiers: NullifierStore,
    theta_snapshots: BTreeMap<u64, Vec<u8>>,
}

/// Hash-map-backed [`ChainStore`] with the same atomicity contract as the
/// persistent implementation.
#[derive(Default)]
pub struct InMemoryChainStore {
    inner: Mutex<Inner>,
}

impl InMemoryChainStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the canonical hash for a height; the adapter stands in for
    /// the storage collaborator's height index maintenance.
    pub fn set_canonical(&self, height: u64, hash: Hash) {
        self.inner.lock().canonical_by_height.insert(height, hash);
    }

    /// Active nullifier count, for test assertions.
    pub fn nullifier_count(&self) -> usize {
        self.inner.lock().nullifiers.len()
    }

    /// Synchronous membership probe, for test assertions.
    pub fn nullifier_present_sync(&self, nullifier: &Nullifier) -> bool {
        self.inner.lock().nullifiers.contains(nullifier)
    }

    /// Synchronous snapshot read, for test assertions.
    pub fn theta_snapshot_sync(&self, height: u64) -> Option<ThetaState> {
        self.inner
            .lock()
            .theta_snapshots
            .get(&height)
            .map(|bytes| bincode::deserialize(bytes).expect("snapshot encoded by this adapter"))
    }
}

#[async_trait]
impl ChainStore for InMemoryChainStore {
    async fn get_header(&self, hash: &Hash) -> Result<Option<BlockHeader>, StoreError> {
        Ok(self.inner.lock().headers.get(hash).cloned())
    }

    async fn put_header(&self, header: &BlockHeader) -> Result<(), StoreError> {
        self.inner.lock().headers.insert(header.hash(), header.clone());
        Ok(())
    }

    async fn get_header_by_height(&self, height: u64) -> Result<Option<BlockHeader>, StoreError> {
        let inner = self.inner.lock();
        Ok(inner
            .canonical_by_height
            .get(&height)
            .and_then(|hash| inner.headers.get(hash))
            .cloned())
    }

    async fn nullifier_present(&self, nullifier: &Nullifier) -> Result<bool, StoreError> {
        Ok(self.inner.lock().nullifiers.contains(nullifier))
    }

    async fn insert_nullifiers(
        &self,
        nullifiers: &[Nullifier],
        height: u64,
    ) -> Result<(), StoreError> {
        self.inner.lock().nullifiers.insert_block(nullifiers, height)
    }

    async fn remove_nullifiers(&self, nullifiers: &[Nullifier]) -> Result<(), StoreError> {
        self.inner.lock().nullifiers.remove_block(nullifiers);
        Ok(())
    }

    async fn evict_nullifiers(&self, up_to_height: u64, ttl: u64) -> Result<usize, StoreError> {
        Ok(self.inner.lock().nullifiers.evict_expired(up_to_height, ttl))
    }

    async fn put_theta_snapshot(&self, height: u64, state: &ThetaState) -> Result<(), StoreError> {
        let bytes = bincode::serialize(state)
            .map_err(|e| StoreError::Backend(format!("theta snapshot encode: {e}")))?;
        self.inner.lock().theta_snapshots.insert(height, bytes);
        Ok(())
    }

    async fn theta_snapshot_at(&self, height: u64) -> Result<Option<ThetaState>, StoreError> {
        let inner = self.inner.lock();
        inner
            .theta_snapshots
            .get(&height)
            .map(|bytes| {
                bincode::deserialize(bytes)
                    .map_err(|e| StoreError::Backend(format!("theta snapshot decode: {e}")))
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(tag: u8) -> Nullifier {
        [tag; 32]
    }

    #[tokio::test]
    async fn test_nullifier_contract_matches_domain_store() {
        let store = InMemoryChainStore::new();
        store.insert_nullifiers(&[n(1), n(2)], 5).await.unwrap();
        assert!(store.nullifier_present(&n(1)).await.unwrap());
        assert_eq!(
            store.insert_nullifiers(&[n(3), n(1)], 6).await.unwrap_err(),
            StoreError::NullifierReuse(n(1))
        );
        // Failed batch left nothing behind.
        assert!(!store.nullifier_present(&n(3)).await.unwrap());
    }

    #[tokio::test]
    async fn test_theta_snapshot_round_trip() {
        let store = InMemoryChainStore::new();
        let state = ThetaState {
            theta: shared_types::Fixed::from_ratio(5, 4),
            ema_gap: shared_types::Fixed::from_int(14),
            last_retarget_height: 64,
        };
        store.put_theta_snapshot(64, &state).await.unwrap();
        assert_eq!(store.theta_snapshot_at(64).await.unwrap(), Some(state));
        assert_eq!(store.theta_snapshot_at(128).await.unwrap(), None);
    }
}
