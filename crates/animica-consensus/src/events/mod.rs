//! Event payloads crossing the consensus boundary.

pub mod published;

pub use published::{BlockAcceptedEvent, HeadChangedEvent};
