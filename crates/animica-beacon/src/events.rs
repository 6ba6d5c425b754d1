//! Published events (outgoing).

use serde::{Deserialize, Serialize};
use shared_types::Hash;

/// Emitted when a round publishes its output, by either path.
///
/// The consensus service forwards this on its event bus so contracts and
/// telemetry learn about fresh randomness without polling.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundFinalizedEvent {
    pub round_id: u64,
    pub output: Hash,
    /// True when the fallback rule produced the output.
    pub fallback: bool,
    /// Height at which the round finalized.
    pub height: u64,
}
