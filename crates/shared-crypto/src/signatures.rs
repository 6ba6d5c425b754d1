//! # Ed25519 Header Signatures
//!
//! The default header-signature scheme. Miners sign the canonical
//! pre-signature header bytes; the validator verifies through the consensus
//! `SignatureVerifier` port, for which this module supplies the in-tree
//! implementation. PQ schemes registered in the alg-policy root plug in
//! behind the same port.
//!
//! ## Security Properties
//!
//! - Deterministic nonces (no RNG dependency at signing time)
//! - Constant-time verification in the underlying curve arithmetic

use crate::CryptoError;
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};

/// Ed25519 public key (32 bytes). Doubles as the miner address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ed25519PublicKey([u8; 32]);

impl Ed25519PublicKey {
    /// Create from bytes, validating the curve point.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        VerifyingKey::from_bytes(&bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self(bytes))
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Verify a signature over `message`.
    pub fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> Result<(), CryptoError> {
        let verifying_key =
            VerifyingKey::from_bytes(&self.0).map_err(|_| CryptoError::InvalidPublicKey)?;
        let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
        verifying_key
            .verify(message, &sig)
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }
}

/// Ed25519 signature (64 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ed25519Signature([u8; 64]);

impl Ed25519Signature {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

/// Ed25519 keypair used by block producers and tests.
pub struct Ed25519KeyPair {
    signing_key: SigningKey,
}

impl Ed25519KeyPair {
    /// Generate a random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from a 32-byte secret seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(&seed);
        Self { signing_key }
    }

    /// Public key for this keypair.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign `message`.
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        Ed25519Signature(self.signing_key.sign(message).to_bytes())
    }
}

/// Verify a raw 64-byte signature against a raw 32-byte key.
///
/// Convenience entry point for the consensus port, where key and signature
/// arrive as untyped header fields.
pub fn verify_raw(message: &[u8], signature: &[u8; 64], public_key: &[u8; 32]) -> bool {
    match Ed25519PublicKey::from_bytes(*public_key) {
        Ok(key) => key
            .verify(message, &Ed25519Signature::from_bytes(*signature))
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify_round_trip() {
        let keypair = Ed25519KeyPair::from_seed([7u8; 32]);
        let message = b"canonical header bytes";
        let signature = keypair.sign(message);
        assert!(keypair.public_key().verify(message, &signature).is_ok());
    }

    #[test]
    fn test_tampered_message_rejected() {
        let keypair = Ed25519KeyPair::from_seed([7u8; 32]);
        let signature = keypair.sign(b"original");
        assert_eq!(
            keypair.public_key().verify(b"tampered", &signature),
            Err(CryptoError::SignatureVerificationFailed)
        );
    }

    #[test]
    fn test_verify_raw_rejects_garbage_key() {
        let keypair = Ed25519KeyPair::from_seed([9u8; 32]);
        let signature = keypair.sign(b"msg");
        let mut bad_key = *keypair.public_key().as_bytes();
        bad_key[0] ^= 0xFF;
        // Either an invalid point or a wrong key; both must fail closed.
        assert!(!verify_raw(b"msg", signature.as_bytes(), &bad_key));
    }

    #[test]
    fn test_deterministic_signatures() {
        let keypair = Ed25519KeyPair::from_seed([1u8; 32]);
        assert_eq!(
            keypair.sign(b"msg").as_bytes(),
            keypair.sign(b"msg").as_bytes()
        );
    }
}
