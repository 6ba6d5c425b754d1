//! # Envelope Verification
//!
//! Bag-level verification on top of the per-envelope registry dispatch:
//! stable envelope indexing, in-block duplicate detection and the proof-bag
//! commitment. The consensus service may verify envelopes concurrently; the
//! reduce here orders results by envelope index so concurrency never changes
//! the outcome, including which error a bad bag reports.

use crate::error::{PoiesError, PoiesResult};
use crate::registry::{ProofRegistry, RawContribution, VerifyContext};
use shared_crypto::proof_bag_root;
use shared_types::{wire, Hash, ProofEnvelope};
use std::collections::HashSet;

/// Reduce per-envelope results into bag order, rejecting in-block nullifier
/// duplicates. Input order does not matter; the error at the lowest envelope
/// index wins so every node reports the same rejection.
pub fn reduce_contributions(
    mut results: Vec<(usize, PoiesResult<RawContribution>)>,
) -> PoiesResult<Vec<RawContribution>> {
    results.sort_by_key(|(index, _)| *index);
    let mut contributions = Vec::with_capacity(results.len());
    let mut seen: HashSet<[u8; 32]> = HashSet::with_capacity(results.len());
    for (_, result) in results {
        let contribution = result?;
        if !seen.insert(contribution.nullifier) {
            return Err(PoiesError::DuplicateInBlock(contribution.nullifier));
        }
        contributions.push(contribution);
    }
    Ok(contributions)
}

/// Verify a whole bag sequentially. The parallel path in the consensus
/// service produces the same result by construction.
pub fn verify_bag(
    registry: &ProofRegistry,
    envelopes: &[ProofEnvelope],
    ctx: &VerifyContext,
) -> PoiesResult<Vec<RawContribution>> {
    let results = envelopes
        .iter()
        .enumerate()
        .map(|(index, envelope)| (index, registry.verify(envelope, ctx)))
        .collect();
    reduce_contributions(results)
}

/// Merkle root the header must carry for this bag.
pub fn bag_root(envelopes: &[ProofEnvelope]) -> Hash {
    proof_bag_root(envelopes.iter().map(wire::encode_envelope))
}
