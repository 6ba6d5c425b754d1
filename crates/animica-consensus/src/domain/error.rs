//! Error types for the consensus core.
//!
//! A candidate block maps to exactly one of these on rejection; the block
//! either fully commits or leaves no trace. Variants carry enough context
//! for the operator log line and the per-reason rejection counter.

use shared_types::{Hash, Nullifier, ProofKind};
use thiserror::Error;

/// Consensus error taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsensusError {
    // === Structural ===
    /// Header failed structural validation.
    #[error("Bad header: {0}")]
    BadHeader(String),

    /// Envelope bytes failed structural validation.
    #[error("Bad envelope at index {index}: {reason}")]
    BadEnvelope { index: usize, reason: String },

    /// Envelope payload exceeds its kind's bound.
    #[error("Payload too large for {kind}: {len} bytes > {max}")]
    PayloadTooLarge {
        kind: ProofKind,
        len: usize,
        max: usize,
    },

    /// Envelope kind has no registered verifier.
    #[error("Unsupported proof kind: {0}")]
    UnsupportedKind(ProofKind),

    // === Policy ===
    /// Header policy roots differ from the locally derived set.
    #[error("Policy root mismatch at height {height}")]
    PolicyRootMismatch { height: u64 },

    /// Header-recorded Θ differs from the retarget rule's derivation.
    #[error("Theta mismatch at height {height}: expected {expected}, got {actual}")]
    ThetaMismatch {
        height: u64,
        /// Q64.64 bits of the derived target.
        expected: i128,
        /// Q64.64 bits of the header value.
        actual: i128,
    },

    /// Referenced beacon round has not finalized.
    #[error("Beacon round {0} is not finalized")]
    BeaconNotFinalized(u64),

    /// Referenced beacon round's validity window does not cover the height.
    #[error("Beacon round {round} is stale at height {height}")]
    StaleBeacon { round: u64, height: u64 },

    // === Cryptographic ===
    /// Miner signature failed under the active policy.
    #[error("Bad header signature from miner {0:?}")]
    BadSignature(Hash),

    /// A kind-specific proof verifier rejected its payload.
    #[error("Proof verification failed for {kind} at index {index}: {reason}")]
    VerifyFailed {
        kind: ProofKind,
        index: usize,
        reason: String,
    },

    /// A VDF proof did not recompute.
    #[error("Bad VDF proof in round {0}")]
    BadVdfProof(u64),

    // === Anti-replay ===
    /// Nullifier already active in the store.
    #[error("Nullifier reuse: {0:?}")]
    NullifierReuse(Nullifier),

    /// Two envelopes in the block derived the same nullifier.
    #[error("Duplicate nullifier within block: {0:?}")]
    DuplicateInBlock(Nullifier),

    // === Scoring ===
    /// Score fell short of the active target.
    #[error("Score below theta: s {s_bits} < theta {theta_bits}")]
    ScoreBelowTheta { s_bits: i128, theta_bits: i128 },

    /// ψ aggregation escaped its policy bound; internal corruption guard.
    #[error("Cap exceeded: psi_total bits {psi_bits} > gamma bits {gamma_bits}")]
    CapExceeded { psi_bits: i128, gamma_bits: i128 },

    // === Liveness ===
    /// One envelope's verification exceeded its wall-clock budget.
    #[error("Verification timeout at envelope {index}: {elapsed_ms} ms > {budget_ms} ms")]
    VerifyTimeout {
        index: usize,
        elapsed_ms: u64,
        budget_ms: u64,
    },

    /// A head switch would rewind deeper than policy allows.
    #[error("Deep reorg rejected: depth {depth} > {max_depth}")]
    DeepReorg { depth: u64, max_depth: u64 },

    // === System ===
    /// A chain-state or execution hook failed; the block was rolled back.
    #[error("State hook failure: {0}")]
    StateHookFailure(String),

    /// Beacon subsystem failure outside the error paths above.
    #[error("Beacon internal error: {0}")]
    BeaconInternal(String),
}

impl ConsensusError {
    /// Stable label for the per-reason rejection counter.
    pub fn reason_label(&self) -> &'static str {
        match self {
            ConsensusError::BadHeader(_) => "bad_header",
            ConsensusError::BadEnvelope { .. } => "bad_envelope",
            ConsensusError::PayloadTooLarge { .. } => "payload_too_large",
            ConsensusError::UnsupportedKind(_) => "unsupported_kind",
            ConsensusError::PolicyRootMismatch { .. } => "policy_root_mismatch",
            ConsensusError::ThetaMismatch { .. } => "theta_mismatch",
            ConsensusError::BeaconNotFinalized(_) => "beacon_not_finalized",
            ConsensusError::StaleBeacon { .. } => "stale_beacon",
            ConsensusError::BadSignature(_) => "bad_signature",
            ConsensusError::VerifyFailed { .. } => "verify_failed",
            ConsensusError::BadVdfProof(_) => "bad_vdf_proof",
            ConsensusError::NullifierReuse(_) => "nullifier_reuse",
            ConsensusError::DuplicateInBlock(_) => "duplicate_in_block",
            ConsensusError::ScoreBelowTheta { .. } => "score_below_theta",
            ConsensusError::CapExceeded { .. } => "cap_exceeded",
            ConsensusError::VerifyTimeout { .. } => "verify_timeout",
            ConsensusError::DeepReorg { .. } => "deep_reorg",
            ConsensusError::StateHookFailure(_) => "state_hook_failure",
            ConsensusError::BeaconInternal(_) => "beacon_internal",
        }
    }
}

/// Result type for consensus operations.
pub type ConsensusResult<T> = Result<T, ConsensusError>;

/// Failure from a chain-state hook, split so nullifier reuse keeps its
/// identity through the port boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A nullifier in the batch is already active.
    #[error("nullifier already active: {0:?}")]
    NullifierReuse(Nullifier),

    /// Backend failure (I/O, serialization, collaborator down).
    #[error("store backend failure: {0}")]
    Backend(String),
}

impl From<StoreError> for ConsensusError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NullifierReuse(n) => ConsensusError::NullifierReuse(n),
            StoreError::Backend(msg) => ConsensusError::StateHookFailure(msg),
        }
    }
}
