//! # Lottery Draw
//!
//! Every block enters a lottery: a deterministic digest over
//! (parent, miner, nonce, beacon output) maps to `u ∈ (0, 1]`, and
//! `−ln(u)` is the exponential variate the score builds on. The beacon
//! output in the preimage stops miners from grinding a favorable draw ahead
//! of the round closing.

use shared_crypto::tagged_hash;
use shared_types::{Address, Fixed, Hash};

/// Domain tag for the lottery digest.
pub const DOMAIN_LOTTERY: &[u8] = b"animica/lottery/v1";

/// Derive the lottery digest a header must commit to in `seed_u`.
pub fn seed_digest(parent_hash: &Hash, miner: &Address, nonce: u64, beacon_output: &Hash) -> Hash {
    let mut preimage = Vec::with_capacity(104);
    preimage.extend_from_slice(parent_hash);
    preimage.extend_from_slice(miner);
    preimage.extend_from_slice(&nonce.to_be_bytes());
    preimage.extend_from_slice(beacon_output);
    tagged_hash(DOMAIN_LOTTERY, &preimage)
}

/// The top 128 bits of the digest, big-endian: the fractional numerator of
/// the draw. `u = (fraction + 1) / 2^128`, so `u` can never be zero.
pub fn fraction_bits(digest: &Hash) -> u128 {
    u128::from_be_bytes(digest[..16].try_into().expect("digest has 32 bytes"))
}

/// The exponential variate `−ln(u)` for a lottery digest, in Q64.64.
pub fn draw(digest: &Hash) -> Fixed {
    Fixed::ln_recip_unit(fraction_bits(digest))
}
