//! Published events (outgoing).
//!
//! Acceptance and head movement are announced on the event bus so storage,
//! indexing and telemetry collaborators react without polling the core.

use serde::{Deserialize, Serialize};
use shared_types::{Address, Fixed, Hash};

/// Published after a candidate block is admitted to the forest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockAcceptedEvent {
    pub block_hash: Hash,
    pub height: u64,
    pub miner: Address,
    /// Final score of the block.
    pub s_value: Fixed,
    /// Target the score cleared.
    pub theta: Fixed,
    /// Fork-choice weight contributed, `s − Θ`.
    pub weight: Fixed,
    /// Envelopes the block carried.
    pub envelope_count: usize,
}

/// Published when the canonical head moves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadChangedEvent {
    pub old_head: Hash,
    pub new_head: Hash,
    pub height: u64,
    /// Rewind depth; zero for plain extensions.
    pub reorg_depth: u64,
}
