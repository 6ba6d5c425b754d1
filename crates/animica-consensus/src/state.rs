//! Chain head and validation outcome types.

use animica_poies::ScoreBreakdown;
use serde::{Deserialize, Serialize};
use shared_types::Hash;

/// The canonical chain tip as seen by this node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainHead {
    pub block_hash: Hash,
    pub height: u64,
    pub timestamp: u64,
}

/// Blocks removed and added by a head switch, in application order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorgDelta {
    /// Rewound block hashes, old tip first.
    pub removed: Vec<Hash>,
    /// Applied block hashes, ancestor side first, new tip last.
    pub added: Vec<Hash>,
}

impl ReorgDelta {
    /// Depth of the rewind; zero for a plain extension.
    pub fn depth(&self) -> u64 {
        self.removed.len() as u64
    }
}

/// A fully validated and admitted block.
#[derive(Clone, Debug)]
pub struct AcceptedBlock {
    pub hash: Hash,
    pub height: u64,
    /// Whether this block is now the canonical head.
    pub head_changed: bool,
    /// Rewind depth of the head switch; zero for extensions.
    pub reorg_depth: u64,
    /// Set when the block's branch won on weight but the switch exceeded
    /// the reorg bound; the node stays on its current chain and alerts.
    pub deep_reorg_rejected: Option<u64>,
    /// The score accounting the block was admitted under.
    pub breakdown: ScoreBreakdown,
}

/// Result of driving a candidate block through the validator.
#[derive(Clone, Debug)]
pub enum BlockOutcome {
    /// Admitted to the forest (and possibly the canonical chain).
    Accepted(Box<AcceptedBlock>),
    /// Validation was cancelled cooperatively; nothing was mutated.
    Cancelled,
}
