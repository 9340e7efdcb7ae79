//! # Revocation Registry
//!
//! The unified API for recording credential revocations and serving them
//! to verifiers as an append-only, time-ordered feed.
//!
//! ## Overview
//!
//! - **Revoke**: a token, a set of claim values, or everything issued
//!   before a cut-off. Raw input is digested before it is stored.
//! - **Poll**: verifiers ask for everything recorded since their cursor and
//!   resume from the returned watermark.
//! - **Prune**: records older than the longest credential lifetime are
//!   dropped in the background.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use revocation_registry::{Registry, RegistryConfig, StoreConfig};
//! use revocation_registry::core::{RevocationWriteFact, Timestamp};
//!
//! async fn example() {
//!     let config = RegistryConfig {
//!         store: StoreConfig::sqlite("revocations.db"),
//!         ..Default::default()
//!     };
//!     let registry = Registry::from_config(config).unwrap();
//!     let pruner = registry.start_pruner().unwrap();
//!
//!     registry
//!         .revoke(RevocationWriteFact::claims([("sub", "u1")], 1_700_000_000u64).into())
//!         .await
//!         .unwrap();
//!
//!     let mut poller = registry.poller(Timestamp::ZERO);
//!     let records = poller.poll().await.unwrap();
//! #   let _ = records;
//!
//!     pruner.shutdown().await;
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `revocation_registry::core` - Facts, digests and canonicalization
//! - `revocation_registry::store` - Storage abstraction, SQLite and memory

pub mod config;
pub mod error;
pub mod poll;
pub mod pruner;
pub mod registry;

// Re-export component crates
pub use revocation_registry_core as core;
pub use revocation_registry_store as store;

// Re-export main types for convenience
pub use config::{HashingConfig, RegistryConfig, RetentionConfig, StoreConfig};
pub use error::{ErrorClass, RegistryError, Result};
pub use poll::FeedPoller;
pub use pruner::Pruner;
pub use registry::{HealthReport, HealthStatus, Registry};

// Re-export commonly used core types
pub use revocation_registry_core::{
    HashAlgorithm, RevocationKind, RevocationReadFact, RevocationRecord, RevocationRequest,
    RevocationWriteFact, Timestamp,
};
