//! In-memory adapters for the outbound ports.
//!
//! These back the unit and integration suites and the single-process dev
//! node; production deployments substitute the real storage and execution
//! collaborators at wiring time.

pub mod chain_store;
pub mod event_bus;
pub mod execution;

pub use chain_store::InMemoryChainStore;
pub use event_bus::InMemoryEventBus;
pub use execution::{NoopExecution, RecordingExecution};
