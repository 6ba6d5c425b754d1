//! # Error Types
//!
//! Errors shared across the consensus-core crates. Subsystem-specific
//! taxonomies live with their subsystems; this module only carries the
//! codec-level errors every consumer of the wire format sees.

use thiserror::Error;

/// Errors produced while decoding canonical wire bytes.
///
/// Decoding is strict: any deviation from the canonical form is an error,
/// never a best-effort parse, so that re-encoding a decoded value always
/// reproduces the original bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// Input ended before a fixed-width field.
    #[error("unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    /// Input has bytes past the last field.
    #[error("trailing bytes after canonical value: {count}")]
    TrailingBytes { count: usize },

    /// Envelope carried an unregistered kind tag.
    #[error("unknown proof kind tag: {0}")]
    UnknownProofKind(u16),

    /// Declared payload length exceeds the absolute wire bound.
    #[error("envelope payload too large: {len} bytes > {max}")]
    PayloadTooLarge { len: usize, max: usize },

    /// Declared nullifier input length exceeds the absolute wire bound.
    #[error("nullifier input too large: {len} bytes > {max}")]
    NullifierInputTooLarge { len: usize, max: usize },

    /// Declared envelope count exceeds the absolute wire bound.
    #[error("proof bag too large: {count} envelopes > {max}")]
    TooManyEnvelopes { count: usize, max: usize },
}
