//! Full-stack test harness: a consensus service over the in-memory
//! adapters, plus block builders that produce fully consistent, signed
//! candidates.

use animica_consensus::{
    AcceptedBlock, BlockOutcome, ConsensusApi, ConsensusConfig, ConsensusService,
    Ed25519HeaderVerifier, InMemoryChainStore, InMemoryEventBus, RecordingExecution,
};
use animica_poies::{
    bag_root, lottery, NullifierScope, PoiesResult, ProofRegistry, PsiKnot, PsiMapping,
    ScoringPolicy, VerifierDescriptor, VerifyContext,
};
use shared_crypto::Ed25519KeyPair;
use shared_types::{Block, BlockHeader, Fixed, Nullifier, ProofEnvelope, ProofKind, ProofMetrics};
use std::sync::Arc;

pub type TestService = ConsensusService<
    InMemoryChainStore,
    RecordingExecution,
    InMemoryEventBus,
    Ed25519HeaderVerifier,
>;

/// Harness bundling the service with handles on its collaborators.
pub struct Harness {
    pub service: TestService,
    pub store: Arc<InMemoryChainStore>,
    pub execution: Arc<RecordingExecution>,
    pub bus: Arc<InMemoryEventBus>,
    pub keypair: Ed25519KeyPair,
    pub genesis: BlockHeader,
}

/// Test verifier: envelope structure is produced by the helpers below, so
/// scenario tests steer ψ through `metrics.units` alone.
fn accept_any(_envelope: &ProofEnvelope, _ctx: &VerifyContext) -> PoiesResult<()> {
    Ok(())
}

/// One work unit scores ψ = 1000, far above any possible lottery draw
/// (≤ 128·ln 2 ≈ 88.7), so fork-weight comparisons in scenarios are exact.
pub fn heavy_registry() -> ProofRegistry {
    let mut registry = ProofRegistry::new();
    registry
        .register(
            ProofKind::Ai,
            VerifierDescriptor {
                verify: accept_any,
                psi: PsiMapping::new(
                    ProofKind::Ai,
                    vec![PsiKnot {
                        units: 1,
                        psi: Fixed::from_int(1_000),
                    }],
                )
                .expect("single knot is monotone"),
                cap: Fixed::from_int(10_000),
                max_payload: 64,
                scope: NullifierScope::Epoch,
            },
        )
        .expect("empty registry");
    registry
}

/// Policy used by the harness: near-zero target so acceptance never hinges
/// on a lucky draw, and a Γ large enough for multi-envelope bags.
pub fn harness_config() -> ConsensusConfig {
    let mut config = ConsensusConfig::default();
    config.retarget.theta_genesis = Fixed::from_ratio(1, 1 << 30);
    config.retarget.theta_min = config.retarget.theta_genesis;
    config.scoring = ScoringPolicy {
        gamma: Fixed::from_int(10_000),
        escort_threshold: 2,
        escort_bonus: Fixed::from_ratio(1, 10),
    };
    config
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    pub fn with_config(tweak: impl FnOnce(&mut ConsensusConfig)) -> Self {
        let mut config = harness_config();
        tweak(&mut config);
        let registry = heavy_registry();
        let keypair = Ed25519KeyPair::from_seed([0x5E; 32]);
        let genesis = BlockHeader {
            version: 1,
            height: 0,
            parent_hash: [0; 32],
            timestamp: 1_700_000_000,
            miner: [0; 32],
            nonce: 0,
            theta: config.retarget.theta_genesis,
            seed_u: [0; 32],
            proof_bag_root: bag_root(&[]),
            beacon_round: 0,
            state_root: [0; 32],
            receipts_root: [0; 32],
            da_root: [0; 32],
            policy_roots: config.derive_policy_roots(&registry),
            signature: [0; 64],
        };
        let store = Arc::new(InMemoryChainStore::new());
        let execution = Arc::new(RecordingExecution::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let service = ConsensusService::new(
            genesis.clone(),
            config,
            registry,
            store.clone(),
            execution.clone(),
            bus.clone(),
            Arc::new(Ed25519HeaderVerifier),
        );
        Self {
            service,
            store,
            execution,
            bus,
            keypair,
            genesis,
        }
    }

    /// Build a signed, fully consistent child of `parent`.
    pub fn build_block(
        &self,
        parent: &BlockHeader,
        envelopes: Vec<ProofEnvelope>,
        nonce: u64,
    ) -> Block {
        let miner = *self.keypair.public_key().as_bytes();
        let parent_hash = parent.hash();
        let theta = self
            .service
            .theta_after(&parent_hash)
            .expect("parent known to forest");
        let beacon_output = self
            .service
            .beacon()
            .finalized(0)
            .expect("genesis round finalized")
            .output;
        let mut header = BlockHeader {
            version: 1,
            height: parent.height + 1,
            parent_hash,
            timestamp: parent.timestamp + 12,
            miner,
            nonce,
            theta,
            seed_u: lottery::seed_digest(&parent_hash, &miner, nonce, &beacon_output),
            proof_bag_root: bag_root(&envelopes),
            beacon_round: 0,
            state_root: [0; 32],
            receipts_root: [0; 32],
            da_root: [0; 32],
            policy_roots: self.service.policy_roots(),
            signature: [0; 64],
        };
        header.signature = *self.keypair.sign(&header.signing_bytes()).as_bytes();
        Block { header, envelopes }
    }

    /// Validate and unwrap an expected acceptance.
    pub async fn accept(&self, block: Block) -> AcceptedBlock {
        match self
            .service
            .validate_block(block)
            .await
            .expect("block accepted")
        {
            BlockOutcome::Accepted(accepted) => *accepted,
            BlockOutcome::Cancelled => panic!("unexpected cancellation"),
        }
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

/// An AI test envelope: one work unit, tag-distinct nullifier input.
pub fn ai_envelope(tag: u8) -> ProofEnvelope {
    ProofEnvelope {
        kind: ProofKind::Ai,
        payload: vec![],
        producer: [tag; 32],
        nullifier_input: vec![tag, 0xA1],
        metrics: ProofMetrics {
            units: 1,
            quality_millis: 1_000,
        },
    }
}

/// The nullifier an [`ai_envelope`] derives anywhere in epoch 0.
pub fn ai_nullifier(tag: u8) -> Nullifier {
    animica_poies::derive_nullifier(
        ProofKind::Ai,
        &[tag, 0xA1],
        NullifierScope::Epoch,
        &VerifyContext {
            height: 1,
            beacon_round: 0,
        },
    )
}
