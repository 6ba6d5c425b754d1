//! # Animica PoIES - Scoring Engine
//!
//! Proof-of-Informative-Entropic-Score: a lottery draw plus bounded
//! useful-work contributions, compared against the difficulty target Θ.
//!
//! ## Pipeline
//!
//! ```text
//! ProofEnvelope ──registry.verify──→ RawContribution (ψ_raw, nullifier)
//!                                         │
//!                    reduce (bag order, duplicate check)
//!                                         │
//! lottery draw ──────────────────→ score_block ──→ ScoreBreakdown
//! ```
//!
//! ## Determinism
//!
//! Everything here is a pure function of (inputs, policy): verifier
//! functions are side-effect free, ψ tables are data, and all arithmetic is
//! Q64.64 fixed-point. The crate holds no mutable state; the consensus
//! service owns orchestration and the nullifier store.

pub mod envelope;
pub mod error;
pub mod lottery;
pub mod psi;
pub mod registry;
pub mod scorer;

// Re-export main types
pub use envelope::{bag_root, reduce_contributions, verify_bag};
pub use error::{PoiesError, PoiesResult};
pub use psi::{PsiKnot, PsiMapping};
pub use registry::{
    attestation_digest, derive_nullifier, hash_share_digest, NullifierScope, ProofRegistry,
    RawContribution, VerifierDescriptor, VerifyContext, VerifyFn, NULLIFIER_EPOCH_SPAN,
};
pub use scorer::{score_block, ScoreBreakdown, ScoringPolicy};
