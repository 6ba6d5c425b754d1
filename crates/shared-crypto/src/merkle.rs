//! # Proof-Bag Merkle Commitment
//!
//! Binary Merkle tree over the ordered, canonically-encoded proof envelopes
//! of a block. Leaf and node hashes live in separate domains so an interior
//! node can never be confused with a leaf; a level with an odd node promotes
//! the last node unchanged.

use crate::hashing::{tagged_hash, tagged_hash_pair, Hash};

/// Domain tag for leaf hashes.
pub const DOMAIN_PROOFBAG_LEAF: &[u8] = b"animica/proofbag/leaf/v1";

/// Domain tag for interior node hashes.
pub const DOMAIN_PROOFBAG_NODE: &[u8] = b"animica/proofbag/node/v1";

/// Hash one encoded envelope into its leaf digest.
pub fn leaf_hash(encoded_envelope: &[u8]) -> Hash {
    tagged_hash(DOMAIN_PROOFBAG_LEAF, encoded_envelope)
}

/// Root of an empty bag: the bare leaf domain, so an empty bag commits to
/// a value no envelope can produce.
pub fn empty_root() -> Hash {
    tagged_hash(DOMAIN_PROOFBAG_LEAF, &[])
}

/// Compute the proof-bag root over encoded envelopes in bag order.
pub fn proof_bag_root<I, B>(encoded_envelopes: I) -> Hash
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let mut level: Vec<Hash> = encoded_envelopes
        .into_iter()
        .map(|bytes| leaf_hash(bytes.as_ref()))
        .collect();
    if level.is_empty() {
        return empty_root();
    }
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        for pair in level.chunks(2) {
            match pair {
                [left, right] => next.push(tagged_hash_pair(DOMAIN_PROOFBAG_NODE, left, right)),
                [odd] => next.push(*odd),
                _ => unreachable!(),
            }
        }
        level = next;
    }
    level[0]
}
