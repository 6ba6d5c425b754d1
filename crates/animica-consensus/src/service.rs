//! Consensus Service - the block admission pipeline.
//!
//! # Architecture
//!
//! Single-writer discipline: one task drives validation, fork choice and
//! every state mutation. Proof envelopes fan out on a bounded rayon pool
//! and reduce in envelope-index order, so concurrency never changes a
//! verdict. All side effects cross the outbound ports; a rejected block
//! leaves no trace behind.
//!
//! # Pipeline
//!
//! structure → policy roots → signature → timestamps → Θ → beacon →
//! proof bag → lottery seed → score → nullifiers → execution → fork choice

use crate::domain::{
    ConsensusConfig, ConsensusError, ConsensusResult, ForkChoiceStore, ReorgPath, ThetaState,
};
use crate::events::{BlockAcceptedEvent, HeadChangedEvent};
use crate::metrics;
use crate::ports::{ChainStore, ConsensusApi, EventBus, ExecutionGateway, SignatureVerifier,
    SystemTimeSource, TimeSource};
use crate::state::{AcceptedBlock, BlockOutcome, ChainHead, ReorgDelta};
use animica_beacon::{BeaconConfig, BeaconService, FinalizedRound};
use animica_poies::{
    bag_root, lottery, score_block, PoiesError, ProofRegistry, RawContribution, VerifyContext,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use rayon::prelude::*;
use shared_types::{wire, Block, BlockHeader, Fixed, Hash, Nullifier, WireError};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Header format version this node admits.
const HEADER_VERSION: u16 = 1;

/// Per-envelope verification outcome on the worker pool.
enum EnvelopeOutcome {
    Done {
        index: usize,
        result: Result<RawContribution, PoiesError>,
        elapsed_ms: u64,
        budget_ms: u64,
    },
    Cancelled,
}

/// Parent-side context cloned out of the forest before the async stages.
struct ParentView {
    timestamp: u64,
    theta_state: ThetaState,
    is_head: bool,
}

/// The consensus core service.
pub struct ConsensusService<C, E, B, S>
where
    C: ChainStore,
    E: ExecutionGateway,
    B: EventBus,
    S: SignatureVerifier,
{
    store: Arc<C>,
    execution: Arc<E>,
    event_bus: Arc<B>,
    sig_verifier: Arc<S>,
    beacon: Arc<BeaconService>,
    /// Read-mostly; governance swaps the whole `Arc` between blocks.
    registry: RwLock<Arc<ProofRegistry>>,
    config: ConsensusConfig,
    forest: RwLock<ForkChoiceStore>,
    time_source: Box<dyn TimeSource>,
    /// Cooperative cancellation for the in-flight validation.
    cancel: AtomicBool,
    pool: rayon::ThreadPool,
}

impl<C, E, B, S> ConsensusService<C, E, B, S>
where
    C: ChainStore,
    E: ExecutionGateway,
    B: EventBus,
    S: SignatureVerifier,
{
    /// Build the service around a genesis header and frozen policy.
    pub fn new(
        genesis: BlockHeader,
        config: ConsensusConfig,
        registry: ProofRegistry,
        store: Arc<C>,
        execution: Arc<E>,
        event_bus: Arc<B>,
        sig_verifier: Arc<S>,
    ) -> Self {
        let beacon = Arc::new(BeaconService::new(
            BeaconConfig {
                schedule: config.beacon_schedule,
                ..BeaconConfig::default()
            },
            &genesis.hash(),
        ));
        let genesis_state = ThetaState::genesis(&config.retarget);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.verify_workers.max(1))
            .build()
            .expect("verification pool construction");
        Self {
            store,
            execution,
            event_bus,
            sig_verifier,
            beacon,
            registry: RwLock::new(Arc::new(registry)),
            forest: RwLock::new(ForkChoiceStore::new(genesis, genesis_state)),
            config,
            time_source: Box::new(SystemTimeSource),
            cancel: AtomicBool::new(false),
            pool,
        }
    }

    /// Set custom time source (for testing).
    pub fn with_time_source(mut self, time_source: Box<dyn TimeSource>) -> Self {
        self.time_source = time_source;
        self
    }

    /// The beacon cursor; execution delivers commit/reveal/VDF transactions
    /// through it at block-apply time.
    pub fn beacon(&self) -> &BeaconService {
        &self.beacon
    }

    /// Replace the proof registry between blocks (governance upgrade).
    /// Headers validated afterwards must pin the new registry root.
    pub fn swap_registry(&self, registry: ProofRegistry) {
        *self.registry.write() = Arc::new(registry);
    }

    /// Ask the in-flight validation to stop at its next boundary.
    pub fn request_cancellation(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Policy roots every header must currently carry.
    pub fn policy_roots(&self) -> shared_types::PolicyRoots {
        self.config.derive_policy_roots(&self.registry.read().clone())
    }

    /// Active Θ for a child of `parent_hash`, if the parent is known.
    pub fn theta_after(&self, parent_hash: &Hash) -> Option<Fixed> {
        self.forest
            .read()
            .get(parent_hash)
            .map(|node| node.theta_state.theta)
    }

    // === VALIDATION PIPELINE ===

    async fn validate_block_timed(&self, block: Block) -> ConsensusResult<BlockOutcome> {
        let started = Instant::now();
        let result = self.validate_block_inner(block).await;
        // A cancellation request only covers the validation it interrupted.
        self.cancel.store(false, Ordering::SeqCst);
        metrics::observe_validation_seconds(started.elapsed().as_secs_f64());
        match &result {
            Ok(BlockOutcome::Accepted(accepted)) => {
                metrics::record_block_accepted();
                if accepted.head_changed {
                    let head = self.forest.read().head().header.clone();
                    metrics::set_head(head.height, fixed_approx(head.theta));
                }
            }
            Ok(BlockOutcome::Cancelled) => {
                tracing::debug!("block validation cancelled cooperatively");
            }
            Err(err) => {
                metrics::record_block_rejected(err.reason_label());
                tracing::debug!(reason = err.reason_label(), %err, "block rejected");
            }
        }
        result
    }

    async fn validate_block_inner(&self, block: Block) -> ConsensusResult<BlockOutcome> {
        let header = block.header.clone();
        let hash = header.hash();
        let height = header.height;

        let parent = self.header_checks(&header)?;
        let round = self.beacon_checks(&header)?;

        // Proof bag commitment.
        if bag_root(&block.envelopes) != header.proof_bag_root {
            return Err(ConsensusError::BadHeader(
                "proof bag root does not match envelopes".to_string(),
            ));
        }

        if self.cancel.load(Ordering::SeqCst) {
            return Ok(BlockOutcome::Cancelled);
        }

        // Envelope verification on the bounded pool, reduced in bag order.
        let registry = self.registry.read().clone();
        let ctx = VerifyContext {
            height,
            beacon_round: header.beacon_round,
        };
        let contributions =
            match self.verify_envelopes(&registry, &block.envelopes, &ctx)? {
                Some(contributions) => contributions,
                None => return Ok(BlockOutcome::Cancelled),
            };

        // Lottery seed and draw.
        let expected_seed =
            lottery::seed_digest(&header.parent_hash, &header.miner, header.nonce, &round.output);
        if expected_seed != header.seed_u {
            return Err(ConsensusError::BadHeader(
                "lottery seed does not derive from parent, miner, nonce and beacon".to_string(),
            ));
        }
        let draw = lottery::draw(&expected_seed);

        // Score against the derived target.
        let theta = parent.theta_state.theta;
        let breakdown = score_block(&registry, &self.config.scoring, &contributions, draw, theta);
        if breakdown.psi_total > self.config.scoring.gamma {
            return Err(ConsensusError::CapExceeded {
                psi_bits: breakdown.psi_total.to_bits(),
                gamma_bits: self.config.scoring.gamma.to_bits(),
            });
        }
        if !breakdown.accepted {
            return Err(ConsensusError::ScoreBelowTheta {
                s_bits: breakdown.s_value.to_bits(),
                theta_bits: theta.to_bits(),
            });
        }

        // Last cooperative boundary before persistent effects.
        if self.cancel.load(Ordering::SeqCst) {
            return Ok(BlockOutcome::Cancelled);
        }

        let nullifiers: Vec<Nullifier> = contributions.iter().map(|c| c.nullifier).collect();
        let gap = header.timestamp - parent.timestamp;
        let next_state = parent
            .theta_state
            .advance(&self.config.retarget, height, gap);

        if parent.is_head {
            self.admit_extension(block, hash, breakdown, next_state, nullifiers)
                .await
        } else {
            self.admit_side_branch(block, hash, breakdown, next_state, nullifiers)
                .await
        }
    }

    /// Structural, policy, signature, timestamp and Θ checks. Shared by the
    /// full pipeline and header-only early admission.
    fn header_checks(&self, header: &BlockHeader) -> ConsensusResult<ParentView> {
        if header.version != HEADER_VERSION {
            return Err(ConsensusError::BadHeader(format!(
                "unsupported header version {}",
                header.version
            )));
        }
        let hash = header.hash();
        let forest = self.forest.read();
        if forest.contains(&hash) {
            return Err(ConsensusError::BadHeader("header already known".to_string()));
        }
        let parent_node = forest
            .get(&header.parent_hash)
            .ok_or_else(|| ConsensusError::BadHeader("unknown parent".to_string()))?;
        if header.height != parent_node.header.height + 1 {
            return Err(ConsensusError::BadHeader(format!(
                "height {} does not follow parent height {}",
                header.height, parent_node.header.height
            )));
        }
        let parent_index = forest
            .index_of(&header.parent_hash)
            .expect("parent found above");
        let parent = ParentView {
            timestamp: parent_node.header.timestamp,
            theta_state: parent_node.theta_state,
            is_head: parent_index == forest.head_index(),
        };
        drop(forest);

        let expected_roots = self.policy_roots();
        if header.policy_roots != expected_roots {
            return Err(ConsensusError::PolicyRootMismatch {
                height: header.height,
            });
        }

        if !self.sig_verifier.verify_header(
            &header.signing_bytes(),
            &header.signature,
            &header.miner,
        ) {
            return Err(ConsensusError::BadSignature(header.miner));
        }

        if header.timestamp <= parent.timestamp {
            return Err(ConsensusError::BadHeader(format!(
                "timestamp {} not after parent {}",
                header.timestamp, parent.timestamp
            )));
        }
        let now = self.time_source.now();
        if header.timestamp > now + self.config.timestamp_skew_secs {
            return Err(ConsensusError::BadHeader(format!(
                "timestamp {} too far past wall clock {}",
                header.timestamp, now
            )));
        }

        let expected_theta = parent.theta_state.theta;
        if header.theta.to_bits() != expected_theta.to_bits() {
            return Err(ConsensusError::ThetaMismatch {
                height: header.height,
                expected: expected_theta.to_bits(),
                actual: header.theta.to_bits(),
            });
        }

        Ok(parent)
    }

    /// The referenced beacon round must be finalized and its validity
    /// window must cover this height.
    fn beacon_checks(&self, header: &BlockHeader) -> ConsensusResult<FinalizedRound> {
        let round = self
            .beacon
            .finalized(header.beacon_round)
            .ok_or(ConsensusError::BeaconNotFinalized(header.beacon_round))?;
        if header.height <= round.finalized_at {
            // The output did not exist when this height was reached.
            return Err(ConsensusError::BeaconNotFinalized(header.beacon_round));
        }
        if header.height > round.validity_end {
            return Err(ConsensusError::StaleBeacon {
                round: header.beacon_round,
                height: header.height,
            });
        }
        Ok(round)
    }

    /// Fan envelope verification out and reduce in bag order. Returns
    /// `None` when cancellation was observed.
    fn verify_envelopes(
        &self,
        registry: &ProofRegistry,
        envelopes: &[shared_types::ProofEnvelope],
        ctx: &VerifyContext,
    ) -> ConsensusResult<Option<Vec<RawContribution>>> {
        if envelopes.len() > self.config.max_envelopes_per_block {
            return Err(ConsensusError::BadHeader("oversized proof bag".to_string()));
        }
        let cancel = &self.cancel;
        let config = &self.config;
        let mut outcomes: Vec<EnvelopeOutcome> = self.pool.install(|| {
            envelopes
                .par_iter()
                .enumerate()
                .map(|(index, envelope)| {
                    if cancel.load(Ordering::Relaxed) {
                        return EnvelopeOutcome::Cancelled;
                    }
                    let started = Instant::now();
                    let result = registry.verify(envelope, ctx);
                    EnvelopeOutcome::Done {
                        index,
                        result,
                        elapsed_ms: started.elapsed().as_millis() as u64,
                        budget_ms: config.envelope_budget_ms(envelope.metrics.units),
                    }
                })
                .collect()
        });
        if outcomes
            .iter()
            .any(|o| matches!(o, EnvelopeOutcome::Cancelled))
        {
            return Ok(None);
        }
        outcomes.sort_by_key(|o| match o {
            EnvelopeOutcome::Done { index, .. } => *index,
            EnvelopeOutcome::Cancelled => usize::MAX,
        });

        let mut contributions = Vec::with_capacity(outcomes.len());
        let mut seen: HashSet<Nullifier> = HashSet::with_capacity(outcomes.len());
        for outcome in outcomes {
            let EnvelopeOutcome::Done {
                index,
                result,
                elapsed_ms,
                budget_ms,
            } = outcome
            else {
                unreachable!("cancelled outcomes returned above");
            };
            if elapsed_ms > budget_ms {
                return Err(ConsensusError::VerifyTimeout {
                    index,
                    elapsed_ms,
                    budget_ms,
                });
            }
            let contribution = result.map_err(|err| poies_error(index, err))?;
            if !seen.insert(contribution.nullifier) {
                return Err(ConsensusError::DuplicateInBlock(contribution.nullifier));
            }
            contributions.push(contribution);
        }
        Ok(Some(contributions))
    }

    /// Admit a block extending the canonical head: nullifiers, execution,
    /// persistence, head advance.
    async fn admit_extension(
        &self,
        block: Block,
        hash: Hash,
        breakdown: animica_poies::ScoreBreakdown,
        next_state: ThetaState,
        nullifiers: Vec<Nullifier>,
    ) -> ConsensusResult<BlockOutcome> {
        let header = block.header.clone();
        let height = header.height;

        self.store
            .insert_nullifiers(&nullifiers, height)
            .await
            .map_err(ConsensusError::from)?;

        if let Err(reason) = self.execution.verify_roots(&block).await {
            self.rollback_nullifiers(&nullifiers).await;
            return Err(ConsensusError::StateHookFailure(reason));
        }

        if let Err(err) = self.store.put_header(&header).await {
            self.rollback_nullifiers(&nullifiers).await;
            return Err(err.into());
        }

        let insert_result = {
            let mut forest = self.forest.write();
            let old = forest.head_index();
            forest
                .insert(
                    header.clone(),
                    breakdown.weight(),
                    next_state,
                    nullifiers.clone(),
                )
                .map(|index| {
                    forest.set_head(index);
                    old
                })
        };
        let old_head_index = match insert_result {
            Ok(old) => old,
            Err(err) => {
                self.rollback_nullifiers(&nullifiers).await;
                return Err(err);
            }
        };

        let head = ChainHead {
            block_hash: hash,
            height,
            timestamp: header.timestamp,
        };
        let delta = ReorgDelta {
            removed: Vec::new(),
            added: vec![hash],
        };
        if let Err(reason) = self.execution.notify_canonical(head, delta).await {
            // Demote the block to a side branch and undo its nullifiers;
            // persistent chain state is untouched beyond the header record.
            self.forest.write().set_head(old_head_index);
            self.rollback_nullifiers(&nullifiers).await;
            return Err(ConsensusError::StateHookFailure(reason));
        }

        self.after_canonical_advance(&header, &next_state, breakdown.theta).await;
        self.publish_accepted(&header, &breakdown, block.envelopes.len()).await;
        self.publish_head_changed(header.parent_hash, hash, height, 0).await;

        Ok(BlockOutcome::Accepted(Box::new(AcceptedBlock {
            hash,
            height,
            head_changed: true,
            reorg_depth: 0,
            deep_reorg_rejected: None,
            breakdown,
        })))
    }

    /// Admit a side-branch block; switch heads when its branch outweighs
    /// the canonical one and the rewind stays within the reorg bound.
    ///
    /// Side-branch nullifiers are deferred: the store tracks the canonical
    /// chain, so insertion happens at switch time when the branch becomes
    /// canonical, mirroring the rewind.
    async fn admit_side_branch(
        &self,
        block: Block,
        hash: Hash,
        breakdown: animica_poies::ScoreBreakdown,
        next_state: ThetaState,
        nullifiers: Vec<Nullifier>,
    ) -> ConsensusResult<BlockOutcome> {
        let header = block.header.clone();
        let height = header.height;

        if let Err(reason) = self.execution.verify_roots(&block).await {
            return Err(ConsensusError::StateHookFailure(reason));
        }
        self.store.put_header(&header).await.map_err(ConsensusError::from)?;

        let (new_index, old_head_hash, becomes_head, path) = {
            let mut forest = self.forest.write();
            let index = forest.insert(
                header.clone(),
                breakdown.weight(),
                next_state,
                nullifiers,
            )?;
            let old_head_hash = forest.head().hash;
            let better = forest.better_tip(index, forest.head_index());
            let path = if better {
                Some(forest.reorg_path(index))
            } else {
                None
            };
            (index, old_head_hash, better, path)
        };

        let mut head_changed = false;
        let mut reorg_depth = 0;
        let mut deep_reorg_rejected = None;
        if becomes_head {
            let path = path.expect("path computed when better");
            let depth = path.depth();
            if depth > self.config.max_reorg_depth {
                tracing::error!(
                    depth,
                    max_depth = self.config.max_reorg_depth,
                    new_tip = ?&hash[..4],
                    "deep reorg rejected; staying on current chain - operator attention required"
                );
                deep_reorg_rejected = Some(depth);
            } else {
                self.switch_head(&path, new_index).await?;
                head_changed = true;
                reorg_depth = depth;
                self.after_canonical_advance(&header, &next_state, breakdown.theta).await;
                self.publish_head_changed(old_head_hash, hash, height, depth).await;
            }
        }

        self.publish_accepted(&header, &breakdown, block.envelopes.len()).await;
        Ok(BlockOutcome::Accepted(Box::new(AcceptedBlock {
            hash,
            height,
            head_changed,
            reorg_depth,
            deep_reorg_rejected,
            breakdown,
        })))
    }

    /// Execute a head switch: mirror nullifiers along the rewind/apply
    /// path, notify execution, move the cursor. Any failure rolls the
    /// store back and keeps the old head.
    async fn switch_head(&self, path: &ReorgPath, target: usize) -> ConsensusResult<()> {
        // Clone the path's node data out of the forest so no lock is held
        // across await points.
        let (rewind_nodes, apply_nodes, new_head) = {
            let forest = self.forest.read();
            let rewind: Vec<(Hash, u64, Vec<Nullifier>)> = path
                .rewind
                .iter()
                .map(|&i| {
                    let n = forest.node(i);
                    (n.hash, n.header.height, n.nullifiers.clone())
                })
                .collect();
            let apply: Vec<(Hash, u64, Vec<Nullifier>)> = path
                .apply
                .iter()
                .map(|&i| {
                    let n = forest.node(i);
                    (n.hash, n.header.height, n.nullifiers.clone())
                })
                .collect();
            let tip = forest.node(target);
            let head = ChainHead {
                block_hash: tip.hash,
                height: tip.header.height,
                timestamp: tip.header.timestamp,
            };
            (rewind, apply, head)
        };

        // Rewind.
        for (_, _, nullifiers) in &rewind_nodes {
            if let Err(err) = self.store.remove_nullifiers(nullifiers).await {
                tracing::error!(%err, "nullifier rewind failed; aborting switch");
                return Err(err.into());
            }
        }

        // Apply, rolling back on the first failure.
        for (applied, (_, height, nullifiers)) in apply_nodes.iter().enumerate() {
            if let Err(err) = self.store.insert_nullifiers(nullifiers, *height).await {
                for (_, _, undo) in apply_nodes.iter().take(applied) {
                    let _ = self.store.remove_nullifiers(undo).await;
                }
                for (_, height, redo) in &rewind_nodes {
                    let _ = self.store.insert_nullifiers(redo, *height).await;
                }
                return Err(err.into());
            }
        }

        let delta = ReorgDelta {
            removed: rewind_nodes.iter().map(|(h, _, _)| *h).collect(),
            added: apply_nodes.iter().map(|(h, _, _)| *h).collect(),
        };
        if let Err(reason) = self.execution.notify_canonical(new_head, delta).await {
            for (_, _, undo) in &apply_nodes {
                let _ = self.store.remove_nullifiers(undo).await;
            }
            for (_, height, redo) in &rewind_nodes {
                let _ = self.store.insert_nullifiers(redo, *height).await;
            }
            return Err(ConsensusError::StateHookFailure(reason));
        }

        self.forest.write().set_head(target);
        metrics::record_reorg_depth(path.depth());
        Ok(())
    }

    /// Post-canonical housekeeping: beacon phases, TTL eviction, retarget
    /// snapshots. Failures here degrade observability, not safety, so they
    /// log instead of rejecting the block.
    async fn after_canonical_advance(
        &self,
        header: &BlockHeader,
        state: &ThetaState,
        prev_theta: Fixed,
    ) {
        for event in self.beacon.on_height(header.height) {
            if let Err(err) = self.event_bus.publish_round_finalized(event).await {
                tracing::warn!(%err, "round finalization event dropped");
            }
        }
        if let Err(err) = self
            .store
            .evict_nullifiers(header.height, self.config.nullifier_ttl)
            .await
        {
            tracing::warn!(%err, "nullifier eviction failed");
        }
        if state.last_retarget_height == header.height {
            if let Err(err) = self.store.put_theta_snapshot(header.height, state).await {
                tracing::warn!(%err, "theta snapshot persistence failed");
            }
            let ratio = if prev_theta.is_zero() {
                1.0
            } else {
                fixed_approx(state.theta) / fixed_approx(prev_theta)
            };
            metrics::record_retarget_ratio(ratio);
            tracing::info!(
                height = header.height,
                theta = %state.theta,
                "difficulty retargeted"
            );
        }
    }

    async fn rollback_nullifiers(&self, nullifiers: &[Nullifier]) {
        if let Err(err) = self.store.remove_nullifiers(nullifiers).await {
            tracing::error!(%err, "nullifier rollback failed; store may need repair");
        }
    }

    async fn publish_accepted(
        &self,
        header: &BlockHeader,
        breakdown: &animica_poies::ScoreBreakdown,
        envelope_count: usize,
    ) {
        let event = BlockAcceptedEvent {
            block_hash: header.hash(),
            height: header.height,
            miner: header.miner,
            s_value: breakdown.s_value,
            theta: breakdown.theta,
            weight: breakdown.weight(),
            envelope_count,
        };
        if let Err(err) = self.event_bus.publish_block_accepted(event).await {
            tracing::warn!(%err, "block acceptance event dropped");
        }
    }

    async fn publish_head_changed(&self, old_head: Hash, new_head: Hash, height: u64, depth: u64) {
        let event = HeadChangedEvent {
            old_head,
            new_head,
            height,
            reorg_depth: depth,
        };
        if let Err(err) = self.event_bus.publish_head_changed(event).await {
            tracing::warn!(%err, "head change event dropped");
        }
    }
}

#[async_trait]
impl<C, E, B, S> ConsensusApi for ConsensusService<C, E, B, S>
where
    C: ChainStore,
    E: ExecutionGateway,
    B: EventBus,
    S: SignatureVerifier,
{
    async fn validate_block(&self, block: Block) -> ConsensusResult<BlockOutcome> {
        self.validate_block_timed(block).await
    }

    async fn validate_block_bytes(&self, bytes: &[u8]) -> ConsensusResult<BlockOutcome> {
        let block = wire::decode_block(bytes).map_err(wire_error)?;
        self.validate_block_timed(block).await
    }

    async fn validate_header_bytes(&self, bytes: &[u8]) -> ConsensusResult<()> {
        let header = wire::decode_header(bytes).map_err(wire_error)?;
        self.header_checks(&header)?;
        self.beacon_checks(&header)?;
        Ok(())
    }

    async fn chain_head(&self) -> ChainHead {
        let forest = self.forest.read();
        let head = forest.head();
        ChainHead {
            block_hash: head.hash,
            height: head.header.height,
            timestamp: head.header.timestamp,
        }
    }

    async fn current_theta(&self) -> Fixed {
        self.forest.read().head().theta_state.theta
    }

    async fn is_known(&self, block_hash: Hash) -> bool {
        self.forest.read().contains(&block_hash)
    }
}

/// Map codec failures onto the structural taxonomy.
fn wire_error(err: WireError) -> ConsensusError {
    match err {
        WireError::UnknownProofKind(_)
        | WireError::PayloadTooLarge { .. }
        | WireError::NullifierInputTooLarge { .. }
        | WireError::TooManyEnvelopes { .. } => ConsensusError::BadEnvelope {
            index: 0,
            reason: err.to_string(),
        },
        WireError::UnexpectedEof { .. } | WireError::TrailingBytes { .. } => {
            ConsensusError::BadHeader(err.to_string())
        }
    }
}

/// Map an engine error onto the consensus taxonomy, attaching the envelope
/// index where the taxonomy carries one.
fn poies_error(index: usize, err: PoiesError) -> ConsensusError {
    match err {
        PoiesError::UnsupportedKind(kind) => ConsensusError::UnsupportedKind(kind),
        PoiesError::PayloadTooLarge { kind, len, max } => {
            ConsensusError::PayloadTooLarge { kind, len, max }
        }
        PoiesError::VerifyFailed { kind, reason } => {
            ConsensusError::VerifyFailed { kind, index, reason }
        }
        PoiesError::DuplicateInBlock(n) => ConsensusError::DuplicateInBlock(n),
        other => ConsensusError::BadEnvelope {
            index,
            reason: other.to_string(),
        },
    }
}

fn fixed_approx(value: Fixed) -> f64 {
    value.to_bits() as f64 / 2f64.powi(64)
}
