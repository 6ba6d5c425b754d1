//! # Core Domain Entities
//!
//! The chain-facing types every consensus-core subsystem agrees on.
//!
//! ## Clusters
//!
//! - **Chain**: `BlockHeader`, `Block`, `PolicyRoots`
//! - **Proofs**: `ProofKind`, `ProofEnvelope`, `ProofMetrics`
//! - **Identifiers**: `Hash`, `Address`, `Nullifier`

use crate::fixed::Fixed;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use sha3::{Digest, Sha3_256};

// =============================================================================
// CLUSTER A: IDENTIFIERS
// =============================================================================

/// A 32-byte digest (SHA3-256).
pub type Hash = [u8; 32];

/// A 32-byte account address.
pub type Address = [u8; 32];

/// A 32-byte anti-replay digest derived from an accepted proof envelope.
pub type Nullifier = [u8; 32];

/// Domain tag for header hashing and signing.
pub const DOMAIN_HEADER: &[u8] = b"animica/header/v1";

/// Compute a domain-separated SHA3-256 digest.
pub fn tagged_digest(domain: &[u8], bytes: &[u8]) -> Hash {
    let mut hasher = Sha3_256::new();
    hasher.update(domain);
    hasher.update(bytes);
    hasher.finalize().into()
}

// =============================================================================
// CLUSTER B: THE CHAIN
// =============================================================================

/// Digests pinning the policy surface active at a height.
///
/// Governance upgrades replace these wholesale at an activation height; the
/// validator rejects any header whose pins differ from the locally derived
/// set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRoots {
    /// PQ signature-scheme allowlist.
    pub alg_policy_root: Hash,
    /// Pinned zk verifying keys for attestation-backed proof kinds.
    pub zk_vk_set_root: Hash,
    /// Θ retarget parameter set.
    pub retarget_params_root: Hash,
    /// Proof registry descriptor table (kinds, ψ mappings, caps).
    pub proof_registry_root: Hash,
}

/// The header of a block: everything the consensus core validates.
///
/// `state_root`, `receipts_root` and `da_root` are produced by the execution
/// and DA collaborators; the core checks presence and policy but never
/// recomputes them.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Header format version.
    pub version: u16,
    /// Block height; parent height + 1.
    pub height: u64,
    /// Hash of the parent header (chain linkage).
    pub parent_hash: Hash,
    /// Seconds since epoch; strictly after the parent, bounded skew ahead.
    pub timestamp: u64,
    /// Producer address.
    pub miner: Address,
    /// Miner-chosen value feeding the lottery seed.
    pub nonce: u64,
    /// Difficulty target recorded for audit; the authoritative value is
    /// re-derived by the retarget rule during validation.
    pub theta: Fixed,
    /// Commitment to the lottery draw, H(parent ‖ miner ‖ nonce ‖ beacon).
    pub seed_u: Hash,
    /// Merkle root over the ordered proof envelopes.
    pub proof_bag_root: Hash,
    /// Randomness-beacon round consumed by this height.
    pub beacon_round: u64,
    /// State root after execution (collaborator-computed).
    pub state_root: Hash,
    /// Receipts root (collaborator-computed).
    pub receipts_root: Hash,
    /// Data-availability root (collaborator-computed).
    pub da_root: Hash,
    /// Policy pins active at this height.
    pub policy_roots: PolicyRoots,
    /// Miner signature over the canonical pre-signature bytes.
    #[serde_as(as = "Bytes")]
    pub signature: [u8; 64],
}

impl BlockHeader {
    /// Compute the hash of this header.
    ///
    /// The digest covers the canonical pre-signature bytes under the header
    /// domain tag, so the hash commits to everything except the signature.
    pub fn hash(&self) -> Hash {
        tagged_digest(DOMAIN_HEADER, &crate::wire::header_signing_bytes(self))
    }

    /// Bytes the miner signs: the canonical encoding minus the signature.
    pub fn signing_bytes(&self) -> Vec<u8> {
        crate::wire::header_signing_bytes(self)
    }

    /// Check whether this is the genesis header.
    pub fn is_genesis(&self) -> bool {
        self.height == 0 && self.parent_hash == [0u8; 32]
    }
}

/// A candidate block: header plus the ordered proof bag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    /// Proof envelopes in bag order; `proof_bag_root` commits to this order.
    pub envelopes: Vec<ProofEnvelope>,
}

impl Block {
    /// Hash of the block (the header hash).
    pub fn hash(&self) -> Hash {
        self.header.hash()
    }
}

// =============================================================================
// CLUSTER C: PROOFS
// =============================================================================

/// The closed set of useful-work proof kinds.
///
/// The wire id is stable; new kinds arrive only through a coordinated header
/// version bump plus registry upgrade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u16)]
pub enum ProofKind {
    /// Lottery-style hash share.
    HashShare = 0,
    /// Attested AI inference workload.
    Ai = 1,
    /// Attested quantum sampling workload.
    Quantum = 2,
    /// Storage challenge response.
    Storage = 3,
    /// Verifiable-delay-function evaluation.
    Vdf = 4,
}

impl ProofKind {
    /// Every kind, in wire-id order.
    pub const ALL: [ProofKind; 5] = [
        ProofKind::HashShare,
        ProofKind::Ai,
        ProofKind::Quantum,
        ProofKind::Storage,
        ProofKind::Vdf,
    ];

    /// Stable wire identifier.
    pub const fn wire_id(self) -> u16 {
        self as u16
    }

    /// Decode a wire identifier.
    pub const fn from_wire(id: u16) -> Option<ProofKind> {
        match id {
            0 => Some(ProofKind::HashShare),
            1 => Some(ProofKind::Ai),
            2 => Some(ProofKind::Quantum),
            3 => Some(ProofKind::Storage),
            4 => Some(ProofKind::Vdf),
            _ => None,
        }
    }

    /// Short label used in logs and metric labels.
    pub const fn label(self) -> &'static str {
        match self {
            ProofKind::HashShare => "hash_share",
            ProofKind::Ai => "ai",
            ProofKind::Quantum => "quantum",
            ProofKind::Storage => "storage",
            ProofKind::Vdf => "vdf",
        }
    }
}

impl std::fmt::Display for ProofKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw work magnitudes claimed by a proof, before ψ mapping and caps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofMetrics {
    /// Units of work in the kind's native denomination (difficulty bits,
    /// inference tokens, samples, challenged bytes, VDF iterations).
    pub units: u64,
    /// Quality factor in thousandths; 1000 = nominal.
    pub quality_millis: u32,
}

/// One submitted proof: the unit of verification and anti-replay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofEnvelope {
    pub kind: ProofKind,
    /// Opaque verifier input, bounded per kind by registry policy.
    pub payload: Vec<u8>,
    /// Proof creator; may differ from the block miner.
    pub producer: Address,
    /// Bytes feeding nullifier derivation; uniqueness is enforced by the
    /// registry rule for the kind.
    pub nullifier_input: Vec<u8>,
    pub metrics: ProofMetrics,
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn sample_header() -> BlockHeader {
        BlockHeader {
            version: 1,
            height: 7,
            parent_hash: [0x11; 32],
            timestamp: 1_700_000_000,
            miner: [0x22; 32],
            nonce: 42,
            theta: Fixed::from_ratio(6, 5),
            seed_u: [0x33; 32],
            proof_bag_root: [0x44; 32],
            beacon_round: 3,
            state_root: [0x55; 32],
            receipts_root: [0x66; 32],
            da_root: [0x77; 32],
            policy_roots: PolicyRoots {
                alg_policy_root: [0xA1; 32],
                zk_vk_set_root: [0xA2; 32],
                retarget_params_root: [0xA3; 32],
                proof_registry_root: [0xA4; 32],
            },
            signature: [0u8; 64],
        }
    }

    #[test]
    fn test_header_hash_ignores_signature() {
        let header = sample_header();
        let mut signed = header.clone();
        signed.signature = [0xFF; 64];
        assert_eq!(header.hash(), signed.hash());
    }

    #[test]
    fn test_header_hash_commits_to_fields() {
        let header = sample_header();
        let mut other = header.clone();
        other.nonce += 1;
        assert_ne!(header.hash(), other.hash());
    }

    #[test]
    fn test_proof_kind_wire_round_trip() {
        for kind in ProofKind::ALL {
            assert_eq!(ProofKind::from_wire(kind.wire_id()), Some(kind));
        }
        assert_eq!(ProofKind::from_wire(999), None);
    }

    #[test]
    fn test_is_genesis() {
        let mut header = sample_header();
        assert!(!header.is_genesis());
        header.height = 0;
        header.parent_hash = [0u8; 32];
        assert!(header.is_genesis());
    }
}
