//! In-memory event bus adapter.

use crate::events::{BlockAcceptedEvent, HeadChangedEvent};
use crate::ports::EventBus;
use animica_beacon::RoundFinalizedEvent;
use async_trait::async_trait;
use parking_lot::Mutex;

/// Collects published events for inspection; the production bus forwards to
/// the node's IPC fabric instead.
#[derive(Default)]
pub struct InMemoryEventBus {
    accepted: Mutex<Vec<BlockAcceptedEvent>>,
    head_changes: Mutex<Vec<HeadChangedEvent>>,
    rounds: Mutex<Vec<RoundFinalizedEvent>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of `BlockAccepted` events in publication order.
    pub fn accepted(&self) -> Vec<BlockAcceptedEvent> {
        self.accepted.lock().clone()
    }

    /// Snapshot of `HeadChanged` events in publication order.
    pub fn head_changes(&self) -> Vec<HeadChangedEvent> {
        self.head_changes.lock().clone()
    }

    /// Snapshot of `RoundFinalized` events in publication order.
    pub fn rounds(&self) -> Vec<RoundFinalizedEvent> {
        self.rounds.lock().clone()
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish_block_accepted(&self, event: BlockAcceptedEvent) -> Result<(), String> {
        self.accepted.lock().push(event);
        Ok(())
    }

    async fn publish_head_changed(&self, event: HeadChangedEvent) -> Result<(), String> {
        self.head_changes.lock().push(event);
        Ok(())
    }

    async fn publish_round_finalized(&self, event: RoundFinalizedEvent) -> Result<(), String> {
        self.rounds.lock().push(event);
        Ok(())
    }
}
