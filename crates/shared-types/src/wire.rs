//! # Canonical Wire Codec
//!
//! Hand-written fixed-order, fixed-width big-endian encoding for everything
//! that gets hashed or signed. serde never touches these paths: the header
//! hash must be reproducible byte-for-byte by every implementation, so the
//! layout is pinned here and nowhere else.
//!
//! Layouts (all integers big-endian):
//!
//! ```text
//! header   := version u16 ‖ height u64 ‖ parent_hash 32 ‖ timestamp u64
//!           ‖ miner 32 ‖ nonce u64 ‖ theta i128 ‖ seed_u 32
//!           ‖ proof_bag_root 32 ‖ beacon_round u64 ‖ state_root 32
//!           ‖ receipts_root 32 ‖ da_root 32 ‖ policy_roots 4×32
//!           ‖ signature 64
//! envelope := kind u16 ‖ payload_len u32 ‖ payload ‖ producer 32
//!           ‖ nullifier_input_len u16 ‖ nullifier_input
//!           ‖ units u64 ‖ quality_millis u32
//! block    := header ‖ envelope_count u32 ‖ envelopes
//! ```
//!
//! The signature is excluded from the signing/hashing prefix; see
//! [`header_signing_bytes`].

use crate::entities::{
    Block, BlockHeader, PolicyRoots, ProofEnvelope, ProofKind, ProofMetrics,
};
use crate::errors::WireError;
use crate::fixed::Fixed;

/// Absolute bound on an envelope payload at the codec layer. Per-kind policy
/// bounds are tighter and enforced by the proof registry.
pub const MAX_WIRE_PAYLOAD: usize = 1 << 20;

/// Absolute bound on nullifier input bytes.
pub const MAX_WIRE_NULLIFIER_INPUT: usize = 1024;

/// Absolute bound on envelopes per block at the codec layer.
pub const MAX_WIRE_ENVELOPES: usize = 16_384;

// =============================================================================
// WRITER
// =============================================================================

struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    fn with_capacity(cap: usize) -> Self {
        Self {
            buf: Vec::with_capacity(cap),
        }
    }

    fn put_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn put_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn put_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn put_i128(&mut self, v: i128) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn put_bytes(&mut self, v: &[u8]) {
        self.buf.extend_from_slice(v);
    }
}

// =============================================================================
// READER
// =============================================================================

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], WireError> {
        if self.remaining() < n {
            return Err(WireError::UnexpectedEof {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn take_u16(&mut self) -> Result<u16, WireError> {
        Ok(u16::from_be_bytes(self.take(2)?.try_into().unwrap()))
    }

    fn take_u32(&mut self) -> Result<u32, WireError> {
        Ok(u32::from_be_bytes(self.take(4)?.try_into().unwrap()))
    }

    fn take_u64(&mut self) -> Result<u64, WireError> {
        Ok(u64::from_be_bytes(self.take(8)?.try_into().unwrap()))
    }

    fn take_i128(&mut self) -> Result<i128, WireError> {
        Ok(i128::from_be_bytes(self.take(16)?.try_into().unwrap()))
    }

    fn take_hash(&mut self) -> Result<[u8; 32], WireError> {
        Ok(self.take(32)?.try_into().unwrap())
    }

    fn finish(self) -> Result<(), WireError> {
        if self.remaining() != 0 {
            return Err(WireError::TrailingBytes {
                count: self.remaining(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// HEADER
// =============================================================================

fn write_header_prefix(w: &mut Writer, h: &BlockHeader) {
    w.put_u16(h.version);
    w.put_u64(h.height);
    w.put_bytes(&h.parent_hash);
    w.put_u64(h.timestamp);
    w.put_bytes(&h.miner);
    w.put_u64(h.nonce);
    w.put_i128(h.theta.to_bits());
    w.put_bytes(&h.seed_u);
    w.put_bytes(&h.proof_bag_root);
    w.put_u64(h.beacon_round);
    w.put_bytes(&h.state_root);
    w.put_bytes(&h.receipts_root);
    w.put_bytes(&h.da_root);
    w.put_bytes(&h.policy_roots.alg_policy_root);
    w.put_bytes(&h.policy_roots.zk_vk_set_root);
    w.put_bytes(&h.policy_roots.retarget_params_root);
    w.put_bytes(&h.policy_roots.proof_registry_root);
}

/// Canonical pre-signature bytes: everything except the signature. These are
/// the bytes the miner signs and the header hash commits to.
pub fn header_signing_bytes(h: &BlockHeader) -> Vec<u8> {
    let mut w = Writer::with_capacity(384);
    write_header_prefix(&mut w, h);
    w.buf
}

/// Encode a full header including the signature.
pub fn encode_header(h: &BlockHeader) -> Vec<u8> {
    let mut w = Writer::with_capacity(448);
    write_header_prefix(&mut w, h);
    w.put_bytes(&h.signature);
    w.buf
}

fn read_header(r: &mut Reader<'_>) -> Result<BlockHeader, WireError> {
    Ok(BlockHeader {
        version: r.take_u16()?,
        height: r.take_u64()?,
        parent_hash: r.take_hash()?,
        timestamp: r.take_u64()?,
        miner: r.take_hash()?,
        nonce: r.take_u64()?,
        theta: Fixed::from_bits(r.take_i128()?),
        seed_u: r.take_hash()?,
        proof_bag_root: r.take_hash()?,
        beacon_round: r.take_u64()?,
        state_root: r.take_hash()?,
        receipts_root: r.take_hash()?,
        da_root: r.take_hash()?,
        policy_roots: PolicyRoots {
            alg_policy_root: r.take_hash()?,
            zk_vk_set_root: r.take_hash()?,
            retarget_params_root: r.take_hash()?,
            proof_registry_root: r.take_hash()?,
        },
        signature: r.take(64)?.try_into().unwrap(),
    })
}

/// Decode a header; the input must contain exactly one canonical header.
pub fn decode_header(bytes: &[u8]) -> Result<BlockHeader, WireError> {
    let mut r = Reader::new(bytes);
    let header = read_header(&mut r)?;
    r.finish()?;
    Ok(header)
}

// =============================================================================
// ENVELOPES
// =============================================================================

fn write_envelope(w: &mut Writer, e: &ProofEnvelope) {
    w.put_u16(e.kind.wire_id());
    w.put_u32(e.payload.len() as u32);
    w.put_bytes(&e.payload);
    w.put_bytes(&e.producer);
    w.put_u16(e.nullifier_input.len() as u16);
    w.put_bytes(&e.nullifier_input);
    w.put_u64(e.metrics.units);
    w.put_u32(e.metrics.quality_millis);
}

/// Encode one proof envelope. These bytes are also the Merkle leaf preimage
/// of the proof bag.
pub fn encode_envelope(e: &ProofEnvelope) -> Vec<u8> {
    let mut w = Writer::with_capacity(64 + e.payload.len() + e.nullifier_input.len());
    write_envelope(&mut w, e);
    w.buf
}

fn read_envelope(r: &mut Reader<'_>) -> Result<ProofEnvelope, WireError> {
    let tag = r.take_u16()?;
    let kind = ProofKind::from_wire(tag).ok_or(WireError::UnknownProofKind(tag))?;
    let payload_len = r.take_u32()? as usize;
    if payload_len > MAX_WIRE_PAYLOAD {
        return Err(WireError::PayloadTooLarge {
            len: payload_len,
            max: MAX_WIRE_PAYLOAD,
        });
    }
    let payload = r.take(payload_len)?.to_vec();
    let producer = r.take_hash()?;
    let input_len = r.take_u16()? as usize;
    if input_len > MAX_WIRE_NULLIFIER_INPUT {
        return Err(WireError::NullifierInputTooLarge {
            len: input_len,
            max: MAX_WIRE_NULLIFIER_INPUT,
        });
    }
    let nullifier_input = r.take(input_len)?.to_vec();
    let metrics = ProofMetrics {
        units: r.take_u64()?,
        quality_millis: r.take_u32()?,
    };
    Ok(ProofEnvelope {
        kind,
        payload,
        producer,
        nullifier_input,
        metrics,
    })
}

/// Decode one proof envelope; the input must contain exactly one.
pub fn decode_envelope(bytes: &[u8]) -> Result<ProofEnvelope, WireError> {
    let mut r = Reader::new(bytes);
    let envelope = read_envelope(&mut r)?;
    r.finish()?;
    Ok(envelope)
}

// =============================================================================
// BLOCK
// =============================================================================

/// Encode a block: full header followed by the ordered proof bag.
pub fn encode_block(b: &Block) -> Vec<u8> {
    let mut w = Writer::with_capacity(512 + 128 * b.envelopes.len());
    write_header_prefix(&mut w, &b.header);
    w.put_bytes(&b.header.signature);
    w.put_u32(b.envelopes.len() as u32);
    for e in &b.envelopes {
        write_envelope(&mut w, e);
    }
    w.buf
}

/// Decode a block; the input must contain exactly one canonical block.
pub fn decode_block(bytes: &[u8]) -> Result<Block, WireError> {
    let mut r = Reader::new(bytes);
    let header = read_header(&mut r)?;
    let count = r.take_u32()? as usize;
    if count > MAX_WIRE_ENVELOPES {
        return Err(WireError::TooManyEnvelopes {
            count,
            max: MAX_WIRE_ENVELOPES,
        });
    }
    let mut envelopes = Vec::with_capacity(count);
    for _ in 0..count {
        envelopes.push(read_envelope(&mut r)?);
    }
    r.finish()?;
    Ok(Block { header, envelopes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ProofKind, ProofMetrics};

    fn sample_header() -> BlockHeader {
        BlockHeader {
            version: 1,
            height: 100,
            parent_hash: [0xAB; 32],
            timestamp: 1_700_000_000,
            miner: [0xCD; 32],
            nonce: 7,
            theta: Fixed::from_ratio(6, 5),
            seed_u: [0x01; 32],
            proof_bag_root: [0x02; 32],
            beacon_round: 12,
            state_root: [0x03; 32],
            receipts_root: [0x04; 32],
            da_root: [0x05; 32],
            policy_roots: PolicyRoots {
                alg_policy_root: [0x06; 32],
                zk_vk_set_root: [0x07; 32],
                retarget_params_root: [0x08; 32],
                proof_registry_root: [0x09; 32],
            },
            signature: [0x10; 64],
        }
    }

    fn sample_envelope() -> ProofEnvelope {
        ProofEnvelope {
            kind: ProofKind::Ai,
            payload: vec![1, 2, 3, 4],
            producer: [0xEE; 32],
            nullifier_input: vec![9, 9, 9],
            metrics: ProofMetrics {
                units: 5_000,
                quality_millis: 1_000,
            },
        }
    }

    #[test]
    fn test_header_round_trip() {
        let header = sample_header();
        let bytes = encode_header(&header);
        assert_eq!(decode_header(&bytes).unwrap(), header);
    }

    #[test]
    fn test_header_signing_bytes_exclude_signature() {
        let header = sample_header();
        let signing = header_signing_bytes(&header);
        let full = encode_header(&header);
        assert_eq!(full.len(), signing.len() + 64);
        assert_eq!(&full[..signing.len()], &signing[..]);
    }

    #[test]
    fn test_header_truncated() {
        let bytes = encode_header(&sample_header());
        let err = decode_header(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, WireError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_header_trailing_bytes() {
        let mut bytes = encode_header(&sample_header());
        bytes.push(0);
        assert_eq!(
            decode_header(&bytes).unwrap_err(),
            WireError::TrailingBytes { count: 1 }
        );
    }

    #[test]
    fn test_envelope_round_trip() {
        let envelope = sample_envelope();
        let bytes = encode_envelope(&envelope);
        assert_eq!(decode_envelope(&bytes).unwrap(), envelope);
    }

    #[test]
    fn test_envelope_unknown_kind() {
        let mut bytes = encode_envelope(&sample_envelope());
        bytes[0] = 0xFF;
        bytes[1] = 0xFF;
        assert_eq!(
            decode_envelope(&bytes).unwrap_err(),
            WireError::UnknownProofKind(0xFFFF)
        );
    }

    #[test]
    fn test_envelope_oversized_payload_rejected() {
        // Hand-build an envelope claiming a payload past the wire bound.
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&ProofKind::HashShare.wire_id().to_be_bytes());
        bytes.extend_from_slice(&((MAX_WIRE_PAYLOAD as u32 + 1).to_be_bytes()));
        let err = decode_envelope(&bytes).unwrap_err();
        assert!(matches!(err, WireError::PayloadTooLarge { .. }));
    }

    #[test]
    fn test_block_round_trip() {
        let block = Block {
            header: sample_header(),
            envelopes: vec![sample_envelope(), sample_envelope()],
        };
        let bytes = encode_block(&block);
        assert_eq!(decode_block(&bytes).unwrap(), block);
    }

    #[test]
    fn test_block_envelope_count_bound() {
        let header = sample_header();
        let mut bytes = encode_header(&header);
        bytes.extend_from_slice(&((MAX_WIRE_ENVELOPES as u32 + 1).to_be_bytes()));
        let err = decode_block(&bytes).unwrap_err();
        assert!(matches!(err, WireError::TooManyEnvelopes { .. }));
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let block = Block {
            header: sample_header(),
            envelopes: vec![sample_envelope()],
        };
        assert_eq!(encode_block(&block), encode_block(&block));
    }
}
