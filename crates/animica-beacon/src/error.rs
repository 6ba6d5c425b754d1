//! Error types for the randomness beacon.

use shared_types::Address;
use thiserror::Error;

/// Beacon round lifecycle errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BeaconError {
    /// Round id is unknown to this node.
    #[error("Unknown beacon round: {0}")]
    UnknownRound(u64),

    /// Operation arrived outside the phase that accepts it.
    #[error("Round {round} is in phase {phase}, expected {expected}")]
    WrongPhase {
        round: u64,
        phase: &'static str,
        expected: &'static str,
    },

    /// Commit window closed at the submission height.
    #[error("Commit window for round {round} closed at height {close}, got {height}")]
    CommitWindowClosed { round: u64, close: u64, height: u64 },

    /// Reveal window closed at the submission height.
    #[error("Reveal window for round {round} closed at height {close}, got {height}")]
    RevealWindowClosed { round: u64, close: u64, height: u64 },

    /// Participant committed twice in one round.
    #[error("Duplicate commit from {0:?}")]
    DuplicateCommit(Address),

    /// Reveal without a matching commit.
    #[error("Reveal from {0:?} has no commit")]
    UnknownCommit(Address),

    /// Revealed preimage does not hash to the commitment.
    #[error("Reveal from {0:?} does not match its commitment")]
    CommitMismatch(Address),

    /// Claimed VDF output does not recompute over the round mix.
    #[error("Bad VDF proof for round {0}")]
    BadVdfProof(u64),

    /// VDF verification exceeded its wall-clock budget.
    #[error("VDF verification for round {round} exceeded {budget_ms} ms")]
    VdfTimeout { round: u64, budget_ms: u64 },

    /// A round id was opened twice.
    #[error("Round {0} already exists")]
    RoundExists(u64),
}

/// Result type for beacon operations.
pub type BeaconResult<T> = Result<T, BeaconError>;
