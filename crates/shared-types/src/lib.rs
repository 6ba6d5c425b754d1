//! # Shared Types Crate
//!
//! Domain entities, the canonical wire codec and the Q64.64 fixed-point
//! kernel shared across the Animica consensus core.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every cross-subsystem type is defined here.
//! - **Canonical Bytes**: anything hashed or signed goes through the
//!   hand-written codec in [`wire`]; serde derives exist only for event
//!   payloads and adapter snapshots.
//! - **No Floats**: consensus arithmetic is Q64.64 ([`fixed::Fixed`]) with
//!   round-to-nearest-even, bit-exact on every node.

pub mod entities;
pub mod errors;
pub mod fixed;
pub mod wire;

pub use entities::{
    tagged_digest, Address, Block, BlockHeader, Hash, Nullifier, PolicyRoots, ProofEnvelope,
    ProofKind, ProofMetrics, DOMAIN_HEADER,
};
pub use errors::WireError;
pub use fixed::Fixed;
