//! # Animica Test Suite
//!
//! Unified test crate for the consensus core.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── support.rs        # Full-stack harness over the in-memory adapters
//! └── integration/
//!     ├── scenarios.rs  # End-to-end admission scenarios
//!     └── properties.rs # Cross-crate invariants
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p animica-tests
//!
//! # By category
//! cargo test -p animica-tests integration::scenarios::
//! cargo test -p animica-tests integration::properties::
//!
//! # Benchmarks
//! cargo bench -p animica-tests
//! ```

#![allow(dead_code)]

pub mod integration;
pub mod support;
