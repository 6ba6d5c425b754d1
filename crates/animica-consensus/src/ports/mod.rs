//! Ports: the narrow traits the consensus core drives and is driven by.
//!
//! The core neither reads nor writes persistent storage directly; every
//! side effect crosses one of these boundaries, which is also where tests
//! substitute in-memory fakes.

pub mod inbound;
pub mod outbound;

pub use inbound::ConsensusApi;
pub use outbound::{
    ChainStore, Ed25519HeaderVerifier, EventBus, ExecutionGateway, SignatureVerifier,
    SystemTimeSource, TimeSource,
};
