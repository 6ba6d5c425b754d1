//! # Proof Registry
//!
//! One descriptor per proof kind: the verifier function, the ψ mapping, the
//! per-kind cap, the payload bound and the nullifier rule. The registry is
//! frozen after initialization; governance upgrades build a replacement and
//! swap it between blocks, and `root()` pins the whole table into
//! `policy_roots.proof_registry_root`.
//!
//! Verifier functions are pure: identical (envelope, context) in, identical
//! verdict out, on every node.

use crate::error::{PoiesError, PoiesResult};
use crate::psi::{PsiKnot, PsiMapping};
use shared_crypto::{tagged_hash, vdf_verify, Sha3Hasher};
use shared_types::{Fixed, Hash, Nullifier, ProofEnvelope, ProofKind, ProofMetrics};
use std::collections::BTreeMap;

/// Domain tag for the registry root digest.
pub const DOMAIN_REGISTRY: &[u8] = b"animica/registry/v1";

/// Domain tag for nullifier derivation.
pub const DOMAIN_NULLIFIER: &[u8] = b"animica/nullifier/v1";

/// Heights per nullifier epoch; equals the default nullifier TTL so an
/// epoch-scoped proof becomes replayable only after its store entry expired.
pub const NULLIFIER_EPOCH_SPAN: u64 = 65_536;

/// Iteration ceiling the default Vdf descriptor accepts.
pub const DEFAULT_MAX_VDF_ITERATIONS: u64 = 1 << 22;

// Per-kind payload preimage domains.
const DOMAIN_SHARE: &[u8] = b"animica/proof/hash-share/v1";
const DOMAIN_AI: &[u8] = b"animica/proof/ai/v1";
const DOMAIN_QUANTUM: &[u8] = b"animica/proof/quantum/v1";
const DOMAIN_STORAGE: &[u8] = b"animica/proof/storage/v1";

/// What a nullifier binds to besides the envelope's own input.
///
/// Epoch scoping ties a proof to a height window; beacon scoping ties it to
/// the single round it consumed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NullifierScope {
    /// Context = height / `NULLIFIER_EPOCH_SPAN`.
    Epoch,
    /// Context = the beacon round id.
    BeaconRound,
}

impl NullifierScope {
    const fn tag(self) -> u8 {
        match self {
            NullifierScope::Epoch => 0,
            NullifierScope::BeaconRound => 1,
        }
    }
}

/// Validation context shared by every envelope of one candidate block.
#[derive(Clone, Copy, Debug)]
pub struct VerifyContext {
    /// Height of the candidate block.
    pub height: u64,
    /// Beacon round the candidate consumes.
    pub beacon_round: u64,
}

/// A verified envelope's raw contribution, before caps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawContribution {
    pub kind: ProofKind,
    pub psi_raw: Fixed,
    pub nullifier: Nullifier,
}

/// Kind-specific verifier entry point.
pub type VerifyFn = fn(&ProofEnvelope, &VerifyContext) -> PoiesResult<()>;

/// Everything the registry knows about one proof kind.
#[derive(Clone)]
pub struct VerifierDescriptor {
    /// Pure verifier for the kind's payload format.
    pub verify: VerifyFn,
    /// Policy ψ table.
    pub psi: PsiMapping,
    /// Per-kind contribution cap.
    pub cap: Fixed,
    /// Payload bound, tighter than the wire-level maximum.
    pub max_payload: usize,
    /// Nullifier rule for the kind.
    pub scope: NullifierScope,
}

/// The frozen kind → descriptor table.
#[derive(Clone, Default)]
pub struct ProofRegistry {
    table: BTreeMap<ProofKind, VerifierDescriptor>,
}

impl ProofRegistry {
    /// An empty registry; see [`ProofRegistry::mainnet_default`] for the
    /// shipped policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor. Only valid during initialization or while
    /// building a governance replacement table.
    pub fn register(
        &mut self,
        kind: ProofKind,
        descriptor: VerifierDescriptor,
    ) -> PoiesResult<()> {
        if self.table.contains_key(&kind) {
            return Err(PoiesError::AlreadyRegistered(kind));
        }
        self.table.insert(kind, descriptor);
        Ok(())
    }

    /// The descriptor for a kind, if registered.
    pub fn descriptor(&self, kind: ProofKind) -> Option<&VerifierDescriptor> {
        self.table.get(&kind)
    }

    /// Registered kinds in wire-id order.
    pub fn kinds(&self) -> impl Iterator<Item = ProofKind> + '_ {
        self.table.keys().copied()
    }

    /// Verify one envelope: structural bound, kind verifier, ψ evaluation
    /// and nullifier derivation.
    pub fn verify(
        &self,
        envelope: &ProofEnvelope,
        ctx: &VerifyContext,
    ) -> PoiesResult<RawContribution> {
        let descriptor = self
            .descriptor(envelope.kind)
            .ok_or(PoiesError::UnsupportedKind(envelope.kind))?;
        if envelope.payload.len() > descriptor.max_payload {
            return Err(PoiesError::PayloadTooLarge {
                kind: envelope.kind,
                len: envelope.payload.len(),
                max: descriptor.max_payload,
            });
        }
        (descriptor.verify)(envelope, ctx)?;
        let psi_raw = descriptor.psi.eval(envelope.metrics);
        let nullifier = derive_nullifier(
            envelope.kind,
            &envelope.nullifier_input,
            descriptor.scope,
            ctx,
        );
        Ok(RawContribution {
            kind: envelope.kind,
            psi_raw,
            nullifier,
        })
    }

    /// Digest pinning the full descriptor table.
    ///
    /// Covers kind ids, payload bounds, caps, nullifier scopes and every ψ
    /// knot, in kind order; any policy change moves the root.
    pub fn root(&self) -> Hash {
        let mut hasher = Sha3Hasher::tagged(DOMAIN_REGISTRY);
        for (kind, descriptor) in &self.table {
            hasher.update(&kind.wire_id().to_be_bytes());
            hasher.update(&(descriptor.max_payload as u64).to_be_bytes());
            hasher.update(&descriptor.cap.to_bits().to_be_bytes());
            hasher.update(&[descriptor.scope.tag()]);
            let knots = descriptor.psi.knots();
            hasher.update(&(knots.len() as u16).to_be_bytes());
            for knot in knots {
                hasher.update(&knot.units.to_be_bytes());
                hasher.update(&knot.psi.to_bits().to_be_bytes());
            }
        }
        hasher.finalize()
    }

    /// The policy shipped at genesis: all five kinds with their default ψ
    /// tables and caps.
    pub fn mainnet_default() -> Self {
        let mut registry = Self::new();
        registry
            .register(
                ProofKind::HashShare,
                VerifierDescriptor {
                    verify: verify_hash_share,
                    // Difficulty bits → ψ, saturating at 1.0 for 24+ bits.
                    psi: PsiMapping::new(
                        ProofKind::HashShare,
                        vec![
                            knot(8, 1, 5),
                            knot(16, 3, 5),
                            knot(24, 1, 1),
                        ],
                    )
                    .expect("default hash-share table is monotone"),
                    cap: Fixed::from_int(1),
                    max_payload: 40,
                    scope: NullifierScope::Epoch,
                },
            )
            .expect("empty registry");
        registry
            .register(
                ProofKind::Ai,
                VerifierDescriptor {
                    verify: verify_ai,
                    // Inference tokens → ψ, saturating at 0.5.
                    psi: PsiMapping::new(
                        ProofKind::Ai,
                        vec![knot(1_000, 1, 10), knot(10_000, 1, 2)],
                    )
                    .expect("default ai table is monotone"),
                    cap: Fixed::from_ratio(1, 2),
                    max_payload: 32,
                    scope: NullifierScope::Epoch,
                },
            )
            .expect("one entry per kind");
        registry
            .register(
                ProofKind::Quantum,
                VerifierDescriptor {
                    verify: verify_quantum,
                    // Certified samples → ψ, saturating at 0.4.
                    psi: PsiMapping::new(
                        ProofKind::Quantum,
                        vec![knot(100, 1, 10), knot(5_000, 2, 5)],
                    )
                    .expect("default quantum table is monotone"),
                    cap: Fixed::from_ratio(2, 5),
                    max_payload: 32,
                    scope: NullifierScope::Epoch,
                },
            )
            .expect("one entry per kind");
        registry
            .register(
                ProofKind::Storage,
                VerifierDescriptor {
                    verify: verify_storage,
                    // Challenged mebibytes → ψ, saturating at 0.4.
                    psi: PsiMapping::new(
                        ProofKind::Storage,
                        vec![knot(64, 1, 10), knot(4_096, 2, 5)],
                    )
                    .expect("default storage table is monotone"),
                    cap: Fixed::from_ratio(2, 5),
                    max_payload: 32,
                    scope: NullifierScope::Epoch,
                },
            )
            .expect("one entry per kind");
        registry
            .register(
                ProofKind::Vdf,
                VerifierDescriptor {
                    verify: verify_vdf_proof,
                    // Iterations → ψ, saturating at 0.3.
                    psi: PsiMapping::new(
                        ProofKind::Vdf,
                        vec![knot(1 << 16, 1, 10), knot(1 << 20, 3, 10)],
                    )
                    .expect("default vdf table is monotone"),
                    cap: Fixed::from_ratio(3, 10),
                    max_payload: 72,
                    scope: NullifierScope::BeaconRound,
                },
            )
            .expect("one entry per kind");
        registry
    }
}

fn knot(units: u64, num: i64, den: i64) -> PsiKnot {
    PsiKnot {
        units,
        psi: Fixed::from_ratio(num, den),
    }
}

/// Derive the nullifier for an envelope under its kind's scope rule.
pub fn derive_nullifier(
    kind: ProofKind,
    nullifier_input: &[u8],
    scope: NullifierScope,
    ctx: &VerifyContext,
) -> Nullifier {
    let context = match scope {
        NullifierScope::Epoch => ctx.height / NULLIFIER_EPOCH_SPAN,
        NullifierScope::BeaconRound => ctx.beacon_round,
    };
    let mut hasher = Sha3Hasher::tagged(DOMAIN_NULLIFIER);
    hasher.update(&kind.wire_id().to_be_bytes());
    hasher.update(&[scope.tag()]);
    hasher.update(&context.to_be_bytes());
    hasher.update(nullifier_input);
    hasher.finalize()
}

// =============================================================================
// BUILT-IN VERIFIERS
// =============================================================================

/// Count of leading zero bits in a digest.
fn leading_zero_bits(digest: &Hash) -> u32 {
    let mut bits = 0;
    for byte in digest {
        if *byte == 0 {
            bits += 8;
        } else {
            bits += byte.leading_zeros();
            break;
        }
    }
    bits
}

/// The digest a hash share commits to.
pub fn hash_share_digest(producer: &[u8; 32], share_nonce: u64) -> Hash {
    let mut preimage = Vec::with_capacity(40);
    preimage.extend_from_slice(producer);
    preimage.extend_from_slice(&share_nonce.to_be_bytes());
    tagged_hash(DOMAIN_SHARE, &preimage)
}

/// HashShare: payload = share_nonce u64 ‖ digest 32. The digest must
/// recompute from (producer, nonce) and carry at least the claimed number of
/// leading zero bits (`metrics.units`).
fn verify_hash_share(envelope: &ProofEnvelope, _ctx: &VerifyContext) -> PoiesResult<()> {
    let payload: &[u8; 40] = envelope
        .payload
        .as_slice()
        .try_into()
        .map_err(|_| verify_failed(envelope.kind, "payload is not 40 bytes"))?;
    let share_nonce = u64::from_be_bytes(payload[..8].try_into().unwrap());
    let claimed: Hash = payload[8..].try_into().unwrap();
    let expected = hash_share_digest(&envelope.producer, share_nonce);
    if claimed != expected {
        return Err(verify_failed(envelope.kind, "share digest mismatch"));
    }
    if envelope.metrics.units > 256 {
        return Err(verify_failed(envelope.kind, "claimed difficulty over 256 bits"));
    }
    if u64::from(leading_zero_bits(&expected)) < envelope.metrics.units {
        return Err(verify_failed(envelope.kind, "share difficulty below claim"));
    }
    Ok(())
}

/// The binding digest attested proof kinds carry as their payload.
///
/// The heavy verification (zk circuits for AI/quantum, storage challenge
/// transcripts) runs in the prover stacks pinned by `zk_vk_set_root`; on the
/// consensus path the envelope must bind producer, nullifier input and
/// claimed metrics into the attestation.
pub fn attestation_digest(
    kind: ProofKind,
    producer: &[u8; 32],
    nullifier_input: &[u8],
    metrics: ProofMetrics,
) -> Hash {
    let domain = match kind {
        ProofKind::Ai => DOMAIN_AI,
        ProofKind::Quantum => DOMAIN_QUANTUM,
        ProofKind::Storage => DOMAIN_STORAGE,
        _ => unreachable!("attestation digests exist only for attested kinds"),
    };
    let mut hasher = Sha3Hasher::tagged(domain);
    hasher.update(producer);
    hasher.update(nullifier_input);
    hasher.update(&metrics.units.to_be_bytes());
    hasher.update(&metrics.quality_millis.to_be_bytes());
    hasher.finalize()
}

fn verify_attested(envelope: &ProofEnvelope, _ctx: &VerifyContext) -> PoiesResult<()> {
    let claimed: &[u8; 32] = envelope
        .payload
        .as_slice()
        .try_into()
        .map_err(|_| verify_failed(envelope.kind, "attestation is not 32 bytes"))?;
    let expected = attestation_digest(
        envelope.kind,
        &envelope.producer,
        &envelope.nullifier_input,
        envelope.metrics,
    );
    if *claimed != expected {
        return Err(verify_failed(envelope.kind, "attestation digest mismatch"));
    }
    Ok(())
}

fn verify_ai(envelope: &ProofEnvelope, ctx: &VerifyContext) -> PoiesResult<()> {
    verify_attested(envelope, ctx)
}

fn verify_quantum(envelope: &ProofEnvelope, ctx: &VerifyContext) -> PoiesResult<()> {
    verify_attested(envelope, ctx)
}

fn verify_storage(envelope: &ProofEnvelope, ctx: &VerifyContext) -> PoiesResult<()> {
    verify_attested(envelope, ctx)
}

/// Vdf: payload = iterations u64 ‖ seed 32 ‖ output 32. Iterations must
/// match the claimed metric and the chain must recompute.
fn verify_vdf_proof(envelope: &ProofEnvelope, _ctx: &VerifyContext) -> PoiesResult<()> {
    let payload: &[u8; 72] = envelope
        .payload
        .as_slice()
        .try_into()
        .map_err(|_| verify_failed(envelope.kind, "payload is not 72 bytes"))?;
    let iterations = u64::from_be_bytes(payload[..8].try_into().unwrap());
    let seed: Hash = payload[8..40].try_into().unwrap();
    let output: Hash = payload[40..].try_into().unwrap();
    if iterations != envelope.metrics.units {
        return Err(verify_failed(envelope.kind, "iterations do not match metric"));
    }
    if !vdf_verify(&seed, iterations, &output, DEFAULT_MAX_VDF_ITERATIONS) {
        return Err(verify_failed(envelope.kind, "delay chain does not recompute"));
    }
    Ok(())
}

fn verify_failed(kind: ProofKind, reason: &str) -> PoiesError {
    PoiesError::VerifyFailed {
        kind,
        reason: reason.to_string(),
    }
}
