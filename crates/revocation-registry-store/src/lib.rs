//! # Revocation Registry Store
//!
//! Storage abstraction for the revocation registry. Provides a trait-based
//! interface for an append-only, time-ordered revocation log with SQLite and
//! in-memory implementations.
//!
//! ## Key Types
//!
//! - [`RevocationStore`] - The async trait for all storage operations
//! - [`SqliteStore`] - Durable storage partitioned into time buckets
//! - [`MemoryStore`] - In-memory storage for tests and single instances
//! - [`RevocationFeed`] - Records plus the watermark they were read under
//! - [`Clock`] - Injected time source ([`SystemClock`], [`ManualClock`])
//!
//! ## Usage
//!
//! ```rust,no_run
//! use revocation_registry_core::{RevocationWriteFact, Timestamp};
//! use revocation_registry_store::{RevocationStore, SqliteStore};
//!
//! async fn example() {
//!     let store = SqliteStore::open_memory().unwrap();
//!
//!     store
//!         .append(RevocationWriteFact::claims([("sub", "u1")], 1_700_000_000u64))
//!         .await
//!         .unwrap();
//!
//!     let feed = store.list_since(Timestamp::ZERO).await.unwrap();
//!     let resume_at = feed.next_cursor();
//! #   let _ = resume_at;
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Digest on entry**: raw tokens and claim values are hashed inside
//!   `append` and never reach storage
//! - **Monotonic watermark**: a backwards move is reported as
//!   [`StoreError::WatermarkViolation`], never served
//! - **Bounded retention**: `prune` only removes records older than the
//!   caller's retention horizon

pub mod clock;
pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;
pub mod watermark;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::{SqliteOptions, SqliteStore, DEFAULT_BUCKET_WIDTH, DEFAULT_VISIBILITY_WINDOW};
pub use traits::{PruneReport, RevocationFeed, RevocationStore};
pub use watermark::WatermarkGuard;
