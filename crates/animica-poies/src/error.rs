//! Error types for the PoIES engine.

use shared_types::{Nullifier, ProofKind};
use thiserror::Error;

/// Errors surfaced while verifying envelopes or scoring a proof bag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoiesError {
    /// Envelope kind has no registered verifier.
    #[error("Unsupported proof kind: {0}")]
    UnsupportedKind(ProofKind),

    /// Payload exceeds the kind's registered bound.
    #[error("Payload too large for {kind}: {len} bytes > {max}")]
    PayloadTooLarge {
        kind: ProofKind,
        len: usize,
        max: usize,
    },

    /// The kind-specific verifier rejected the payload.
    #[error("Proof verification failed for {kind}: {reason}")]
    VerifyFailed { kind: ProofKind, reason: String },

    /// Two envelopes in one block derived the same nullifier.
    #[error("Duplicate nullifier within block: {0:?}")]
    DuplicateInBlock(Nullifier),

    /// A registry was built with two descriptors for one kind.
    #[error("Proof kind registered twice: {0}")]
    AlreadyRegistered(ProofKind),

    /// A ψ mapping whose knots are not monotone non-decreasing.
    #[error("Non-monotone psi mapping for {0}")]
    NonMonotonePsiMapping(ProofKind),

    /// Aggregated ψ escaped its policy bound; indicates internal corruption.
    #[error("Cap exceeded: psi_total {psi_total} > gamma {gamma}")]
    CapExceeded { psi_total: String, gamma: String },
}

/// Result type for PoIES operations.
pub type PoiesResult<T> = Result<T, PoiesError>;
