//! # Animica Beacon - Randomness Rounds
//!
//! Commit → reveal → VDF-verify rounds producing one deterministic 32-byte
//! output per round, consumed by PoIES lottery draws and by contracts.
//!
//! ## Phase boundaries are heights
//!
//! Wall clocks disagree; block heights do not. Every window in a round's
//! schedule is height-denominated, and the service advances phases only at
//! block-apply time, so all nodes observe identical transitions.
//!
//! ## Liveness
//!
//! A round that collects too few reveals, or whose delay solution never
//! arrives, still finalizes: the fallback output mixes the valid reveals
//! with the previous round's output. Headers may consume fallback outputs
//! like any other; the `fallback` flag is recorded for observability.

pub mod domain;
pub mod error;
pub mod events;
pub mod metrics;
pub mod service;

// Re-export main types
pub use domain::{
    commitment_digest, genesis_output, BeaconRound, RoundPhase, RoundSchedule,
};
pub use error::{BeaconError, BeaconResult};
pub use events::RoundFinalizedEvent;
pub use service::{BeaconConfig, BeaconService, FinalizedRound};
