//! # Consensus Configuration & Policy Roots
//!
//! Every knob the consensus core honors, loaded at genesis and frozen.
//! Governance upgrades construct a replacement config plus registry and swap
//! them between blocks; nothing here mutates in place.
//!
//! The policy-root digests pin this configuration into headers: a node with
//! different parameters derives different roots and rejects the chain rather
//! than silently diverging.

use animica_beacon::RoundSchedule;
use animica_poies::{ProofRegistry, ScoringPolicy};
use serde::{Deserialize, Serialize};
use shared_crypto::Sha3Hasher;
use shared_types::{Fixed, Hash, PolicyRoots};

/// Domain tag for the signature-scheme allowlist digest.
pub const DOMAIN_ALG_POLICY: &[u8] = b"animica/policy/alg/v1";

/// Domain tag for the zk verifying-key set digest.
pub const DOMAIN_ZK_VK_SET: &[u8] = b"animica/policy/zk-vk/v1";

/// Domain tag for the retarget parameter digest.
pub const DOMAIN_RETARGET_PARAMS: &[u8] = b"animica/policy/retarget/v1";

/// Θ retarget parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetargetParams {
    /// Desired inter-block gap in seconds.
    pub target_gap_secs: u64,
    /// EMA smoothing factor α ∈ (0, 1).
    pub alpha: Fixed,
    /// Blocks between retargets.
    pub window: u64,
    /// Per-retarget ratio clamp; ratio stays in [1/clamp, clamp].
    pub clamp_factor: Fixed,
    /// Observed gaps clamp to [1, max_gap_secs] before entering the EMA.
    pub max_gap_secs: u64,
    /// Floor for Θ.
    pub theta_min: Fixed,
    /// Ceiling for Θ.
    pub theta_max: Fixed,
    /// Θ at genesis.
    pub theta_genesis: Fixed,
}

impl Default for RetargetParams {
    fn default() -> Self {
        Self {
            target_gap_secs: 12,
            alpha: Fixed::from_ratio(1, 8),
            window: 64,
            clamp_factor: Fixed::from_int(4),
            max_gap_secs: 1_024,
            theta_min: Fixed::from_ratio(1, 1 << 20),
            theta_max: Fixed::from_int(1 << 20),
            theta_genesis: Fixed::from_int(1),
        }
    }
}

impl RetargetParams {
    /// Digest pinning these parameters.
    pub fn root(&self) -> Hash {
        let mut hasher = Sha3Hasher::tagged(DOMAIN_RETARGET_PARAMS);
        hasher.update(&self.target_gap_secs.to_be_bytes());
        hasher.update(&self.alpha.to_bits().to_be_bytes());
        hasher.update(&self.window.to_be_bytes());
        hasher.update(&self.clamp_factor.to_bits().to_be_bytes());
        hasher.update(&self.max_gap_secs.to_be_bytes());
        hasher.update(&self.theta_min.to_bits().to_be_bytes());
        hasher.update(&self.theta_max.to_bits().to_be_bytes());
        hasher.update(&self.theta_genesis.to_bits().to_be_bytes());
        hasher.finalize()
    }
}

/// Signature schemes the alg-policy allows for header signatures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u16)]
pub enum SignatureScheme {
    /// The launch scheme.
    Ed25519 = 0,
    /// PQ lattice scheme, activated by governance.
    MlDsa65 = 1,
}

/// The whole consensus-core configuration.
#[derive(Clone, Debug)]
pub struct ConsensusConfig {
    pub retarget: RetargetParams,
    pub scoring: ScoringPolicy,
    pub beacon_schedule: RoundSchedule,
    /// Schemes the alg-policy currently admits.
    pub allowed_schemes: Vec<SignatureScheme>,
    /// Pinned zk verifying-key digests for attested proof kinds.
    pub zk_vk_pins: Vec<Hash>,
    /// Heights a nullifier stays active.
    pub nullifier_ttl: u64,
    /// Deepest head switch the node will apply.
    pub max_reorg_depth: u64,
    /// Seconds a header timestamp may run ahead of local wall clock.
    pub timestamp_skew_secs: u64,
    /// Envelopes admitted per block.
    pub max_envelopes_per_block: usize,
    /// Base wall-clock budget for verifying one envelope.
    pub envelope_base_budget_ms: u64,
    /// Declared work units one budget millisecond covers.
    pub envelope_units_per_ms: u64,
    /// Worker threads for envelope verification.
    pub verify_workers: usize,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            retarget: RetargetParams::default(),
            scoring: ScoringPolicy::default(),
            beacon_schedule: RoundSchedule::default(),
            allowed_schemes: vec![SignatureScheme::Ed25519],
            zk_vk_pins: Vec::new(),
            nullifier_ttl: 65_536,
            max_reorg_depth: 64,
            timestamp_skew_secs: 15,
            max_envelopes_per_block: 4_096,
            envelope_base_budget_ms: 50,
            envelope_units_per_ms: 1_000,
            verify_workers: 4,
        }
    }
}

impl ConsensusConfig {
    /// Digest of the signature-scheme allowlist.
    pub fn alg_policy_root(&self) -> Hash {
        let mut schemes = self.allowed_schemes.clone();
        schemes.sort();
        schemes.dedup();
        let mut hasher = Sha3Hasher::tagged(DOMAIN_ALG_POLICY);
        for scheme in schemes {
            hasher.update(&(scheme as u16).to_be_bytes());
        }
        hasher.finalize()
    }

    /// Digest of the pinned zk verifying keys.
    pub fn zk_vk_set_root(&self) -> Hash {
        let mut pins = self.zk_vk_pins.clone();
        pins.sort();
        let mut hasher = Sha3Hasher::tagged(DOMAIN_ZK_VK_SET);
        for pin in pins {
            hasher.update(&pin);
        }
        hasher.finalize()
    }

    /// The policy roots every header at the current policy must carry.
    pub fn derive_policy_roots(&self, registry: &ProofRegistry) -> PolicyRoots {
        PolicyRoots {
            alg_policy_root: self.alg_policy_root(),
            zk_vk_set_root: self.zk_vk_set_root(),
            retarget_params_root: self.retarget.root(),
            proof_registry_root: registry.root(),
        }
    }

    /// Wall-clock budget for one envelope, proportional to its declared
    /// work.
    pub fn envelope_budget_ms(&self, declared_units: u64) -> u64 {
        self.envelope_base_budget_ms + declared_units / self.envelope_units_per_ms.max(1)
    }
}
