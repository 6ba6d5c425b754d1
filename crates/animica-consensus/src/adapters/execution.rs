//! Execution gateway adapters.

use crate::ports::ExecutionGateway;
use crate::state::{ChainHead, ReorgDelta};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::Block;
use std::sync::atomic::{AtomicBool, Ordering};

/// Accepts every block without executing anything; the dev-node stand-in
/// for the VM collaborator.
#[derive(Default)]
pub struct NoopExecution;

#[async_trait]
impl ExecutionGateway for NoopExecution {
    async fn verify_roots(&self, _block: &Block) -> Result<(), String> {
        Ok(())
    }

    async fn notify_canonical(&self, _head: ChainHead, _delta: ReorgDelta) -> Result<(), String> {
        Ok(())
    }
}

/// Records every hook call and can be told to fail, for exercising the
/// rollback paths.
#[derive(Default)]
pub struct RecordingExecution {
    verified: Mutex<Vec<shared_types::Hash>>,
    canonical: Mutex<Vec<(ChainHead, ReorgDelta)>>,
    fail_verify: AtomicBool,
    fail_notify: AtomicBool,
}

impl RecordingExecution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `verify_roots` calls fail.
    pub fn fail_verify(&self, fail: bool) {
        self.fail_verify.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `notify_canonical` calls fail.
    pub fn fail_notify(&self, fail: bool) {
        self.fail_notify.store(fail, Ordering::SeqCst);
    }

    /// Hashes of blocks whose roots were verified, in call order.
    pub fn verified(&self) -> Vec<shared_types::Hash> {
        self.verified.lock().clone()
    }

    /// Canonical notifications, in call order.
    pub fn canonical(&self) -> Vec<(ChainHead, ReorgDelta)> {
        self.canonical.lock().clone()
    }
}

#[async_trait]
impl ExecutionGateway for RecordingExecution {
    async fn verify_roots(&self, block: &Block) -> Result<(), String> {
        if self.fail_verify.load(Ordering::SeqCst) {
            return Err("execution refused roots".to_string());
        }
        self.verified.lock().push(block.hash());
        Ok(())
    }

    async fn notify_canonical(&self, head: ChainHead, delta: ReorgDelta) -> Result<(), String> {
        if self.fail_notify.load(Ordering::SeqCst) {
            return Err("execution refused canonical update".to_string());
        }
        self.canonical.lock().push((head, delta));
        Ok(())
    }
}
