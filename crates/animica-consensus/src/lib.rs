//! # Animica Consensus - Block Admission & Agreement
//!
//! ## Purpose
//!
//! Validates candidate blocks under PoIES, maintains the difficulty target
//! through the EMA retarget rule, enforces proof anti-replay through the
//! nullifier store, and selects the canonical head by cumulative weight
//! with a bounded reorg depth.
//!
//! ## Admission Pipeline
//!
//! ```text
//! candidate ──header/policy/signature──→ Θ check ──beacon──→ proof bag
//!     │                                                          │
//!     │                       bounded worker pool (index-ordered reduce)
//!     │                                                          │
//!     └────── lottery draw ──→ score ≥ Θ ──→ nullifiers ──→ execution
//!                                                               │
//!                                        fork choice ──→ notify_canonical
//! ```
//!
//! ## Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | Σ ψ ≤ Γ, per-kind ψ ≤ cap | scorer, re-checked before admission |
//! | s ≥ Θ with Θ re-derived from the parent fold | `ThetaMismatch`, `ScoreBelowTheta` |
//! | No active nullifier reused | atomic per-block store insert |
//! | Beacon round Finalized and within validity | `BeaconNotFinalized`, `StaleBeacon` |
//! | Reorg depth ≤ policy bound | `DeepReorg` alert, head unchanged |
//!
//! ## Concurrency
//!
//! One writer advances the state machine; envelope verification fans out on
//! a bounded rayon pool and reduces in envelope-index order; cancellation
//! is cooperative at envelope boundaries and before the execution handoff.

pub mod adapters;
pub mod domain;
pub mod events;
pub mod metrics;
pub mod ports;
pub mod service;
pub mod state;

// Re-export main types
pub use adapters::{InMemoryChainStore, InMemoryEventBus, NoopExecution, RecordingExecution};
pub use domain::{
    ConsensusConfig, ConsensusError, ConsensusResult, ForkChoiceStore, NullifierStore,
    RetargetParams, SignatureScheme, StoreError, ThetaState,
};
pub use events::{BlockAcceptedEvent, HeadChangedEvent};
pub use ports::{
    ChainStore, ConsensusApi, Ed25519HeaderVerifier, EventBus, ExecutionGateway,
    SignatureVerifier, SystemTimeSource, TimeSource,
};
pub use service::ConsensusService;
pub use state::{AcceptedBlock, BlockOutcome, ChainHead, ReorgDelta};
