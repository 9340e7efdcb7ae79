//! # Revocation Registry Testkit
//!
//! Testing utilities for the revocation registry.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known digests that every verifier implementation must reproduce
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Stores driven by a manual clock
//!
//! ## Golden Vectors
//!
//! ```rust
//! use revocation_registry_testkit::vectors::verify_all_vectors;
//!
//! for (name, matches, digest) in verify_all_vectors() {
//!     assert!(matches, "{}: {}", name, digest);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use revocation_registry_testkit::generators::{fact_from_params, FactParams};
//!
//! proptest! {
//!     #[test]
//!     fn digest_never_fails(params: FactParams) {
//!         let fact = fact_from_params(&params);
//!         prop_assert!(RevocationHasher::default().digest_fact(&fact).is_ok());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,ignore
//! use revocation_registry_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::memory(0);
//! let records = fixture.append_globals_at(&[10, 20, 30]).await?;
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::TestFixture;
pub use generators::{fact_from_params, write_fact, FactParams};
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector, VectorInput};
