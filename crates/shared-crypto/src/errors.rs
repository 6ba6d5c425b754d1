//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Signature verification failed.
    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    /// Invalid public key bytes.
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Invalid signature encoding.
    #[error("Invalid signature format")]
    InvalidSignatureFormat,
}
