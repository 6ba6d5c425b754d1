//! Driving ports (inbound API).

use crate::domain::ConsensusResult;
use crate::state::{BlockOutcome, ChainHead};
use async_trait::async_trait;
use shared_types::{Block, Fixed, Hash};

/// Primary consensus API, consumed by P2P ingress and the local producer.
///
/// P2P must not admit a block to gossip before `validate_header_bytes`
/// passes; full validation gates relay and persistence.
#[async_trait]
pub trait ConsensusApi: Send + Sync {
    /// Drive a decoded candidate block through the full admission pipeline.
    async fn validate_block(&self, block: Block) -> ConsensusResult<BlockOutcome>;

    /// Decode and validate a wire-encoded candidate block.
    async fn validate_block_bytes(&self, bytes: &[u8]) -> ConsensusResult<BlockOutcome>;

    /// Early admission: decode a wire-encoded header and run the cheap
    /// checks (structure, policy, signature, timestamp, Θ). No envelope is
    /// verified and nothing is mutated.
    async fn validate_header_bytes(&self, bytes: &[u8]) -> ConsensusResult<()>;

    /// The canonical chain tip.
    async fn chain_head(&self) -> ChainHead;

    /// The difficulty target the next block must clear.
    async fn current_theta(&self) -> Fixed;

    /// Whether a header hash is known to the forest.
    async fn is_known(&self, block_hash: Hash) -> bool;
}
