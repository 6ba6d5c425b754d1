//! # SHA3-256 Hashing
//!
//! Every consensus digest is SHA3-256 under an ASCII domain tag. Domain
//! separation is not optional: two structures must never share a preimage
//! space, so the one-shot helpers below all take the tag first.

use sha3::{Digest, Sha3_256};

/// SHA3-256 output (256-bit).
pub type Hash = [u8; 32];

/// Stateful SHA3-256 hasher for multi-part preimages.
pub struct Sha3Hasher {
    inner: Sha3_256,
}

impl Sha3Hasher {
    /// Create a hasher seeded with a domain tag.
    pub fn tagged(domain: &[u8]) -> Self {
        let mut inner = Sha3_256::new();
        inner.update(domain);
        Self { inner }
    }

    /// Absorb data.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.inner.update(data);
        self
    }

    /// Finalize and return the digest.
    pub fn finalize(self) -> Hash {
        self.inner.finalize().into()
    }
}

/// Hash `data` under `domain` (one-shot).
pub fn tagged_hash(domain: &[u8], data: &[u8]) -> Hash {
    let mut hasher = Sha3Hasher::tagged(domain);
    hasher.update(data);
    hasher.finalize()
}

/// Hash the concatenation of two digests under `domain`.
pub fn tagged_hash_pair(domain: &[u8], a: &Hash, b: &Hash) -> Hash {
    let mut hasher = Sha3Hasher::tagged(domain);
    hasher.update(a);
    hasher.update(b);
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domains_separate() {
        let data = b"same bytes";
        assert_ne!(tagged_hash(b"domain/a", data), tagged_hash(b"domain/b", data));
    }

    #[test]
    fn test_one_shot_matches_stateful() {
        let mut hasher = Sha3Hasher::tagged(b"d");
        hasher.update(b"ab");
        hasher.update(b"cd");
        assert_eq!(hasher.finalize(), tagged_hash(b"d", b"abcd"));
    }

    #[test]
    fn test_pair_order_matters() {
        let a = [1u8; 32];
        let b = [2u8; 32];
        assert_ne!(tagged_hash_pair(b"d", &a, &b), tagged_hash_pair(b"d", &b, &a));
    }
}
