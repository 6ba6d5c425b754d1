//! Driven ports (outbound dependencies).
//!
//! Storage, execution, eventing, signatures and time all live behind these
//! traits. In-memory adapters back the test suites; the node wires real
//! collaborators at startup.

use crate::domain::{StoreError, ThetaState};
use crate::events::{BlockAcceptedEvent, HeadChangedEvent};
use crate::state::{ChainHead, ReorgDelta};
use animica_beacon::RoundFinalizedEvent;
use async_trait::async_trait;
use shared_types::{Block, BlockHeader, Hash, Nullifier};

/// Persistent chain state, owned by the storage collaborator.
///
/// Nullifier mutations here carry the store's atomicity contract: a batch
/// insert either lands whole or reports the first colliding digest without
/// mutating anything.
#[async_trait]
pub trait ChainStore: Send + Sync {
    /// Header by hash.
    async fn get_header(&self, hash: &Hash) -> Result<Option<BlockHeader>, StoreError>;

    /// Persist an accepted header.
    async fn put_header(&self, header: &BlockHeader) -> Result<(), StoreError>;

    /// Canonical header at a height.
    async fn get_header_by_height(&self, height: u64) -> Result<Option<BlockHeader>, StoreError>;

    /// Whether a nullifier is active.
    async fn nullifier_present(&self, nullifier: &Nullifier) -> Result<bool, StoreError>;

    /// Insert one block's nullifiers atomically.
    async fn insert_nullifiers(
        &self,
        nullifiers: &[Nullifier],
        height: u64,
    ) -> Result<(), StoreError>;

    /// Remove one block's nullifiers (reorg rewind or rollback).
    async fn remove_nullifiers(&self, nullifiers: &[Nullifier]) -> Result<(), StoreError>;

    /// Evict entries whose TTL elapsed; returns the evicted count.
    async fn evict_nullifiers(&self, up_to_height: u64, ttl: u64) -> Result<usize, StoreError>;

    /// Persist the retarget fold state at a boundary.
    async fn put_theta_snapshot(&self, height: u64, state: &ThetaState) -> Result<(), StoreError>;

    /// Retarget fold state at a boundary, if recorded.
    async fn theta_snapshot_at(&self, height: u64) -> Result<Option<ThetaState>, StoreError>;
}

/// The execution collaborator.
#[async_trait]
pub trait ExecutionGateway: Send + Sync {
    /// Re-execute the block and check its state/receipt/DA roots. Stateless
    /// with respect to the canonical cursor; called before any head move.
    async fn verify_roots(&self, block: &Block) -> Result<(), String>;

    /// Canonical head moved: replay `delta.added` after rewinding
    /// `delta.removed`.
    async fn notify_canonical(&self, head: ChainHead, delta: ReorgDelta) -> Result<(), String>;
}

/// Event bus for the acceptance choreography.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Announce an admitted block.
    async fn publish_block_accepted(&self, event: BlockAcceptedEvent) -> Result<(), String>;

    /// Announce a head move.
    async fn publish_head_changed(&self, event: HeadChangedEvent) -> Result<(), String>;

    /// Forward a beacon round finalization.
    async fn publish_round_finalized(&self, event: RoundFinalizedEvent) -> Result<(), String>;
}

/// Header-signature verification under the active alg-policy.
///
/// The trait is deliberately untyped on the scheme: the verifier adapter
/// resolves the miner's registered scheme from the allowlist pinned by
/// `alg_policy_root` and dispatches accordingly.
pub trait SignatureVerifier: Send + Sync {
    /// Verify a 64-byte header signature for `miner`.
    fn verify_header(&self, message: &[u8], signature: &[u8; 64], miner: &[u8; 32]) -> bool;
}

/// The launch verifier: miner addresses are Ed25519 public keys.
pub struct Ed25519HeaderVerifier;

impl SignatureVerifier for Ed25519HeaderVerifier {
    fn verify_header(&self, message: &[u8], signature: &[u8; 64], miner: &[u8; 32]) -> bool {
        shared_crypto::verify_raw(message, signature, miner)
    }
}

/// Time source for timestamp validation.
pub trait TimeSource: Send + Sync {
    /// Current unix timestamp in seconds.
    fn now(&self) -> u64;
}

/// Default time source using system time.
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}
