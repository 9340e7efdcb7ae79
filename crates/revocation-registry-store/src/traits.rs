//! Store trait: the abstract interface for revocation persistence.
//!
//! Implementations include SQLite (durable, time-bucketed) and in-memory
//! (tests, single-instance deployments).

use std::time::Duration;

use async_trait::async_trait;
use revocation_registry_core::{RevocationRecord, RevocationWriteFact, Timestamp};

use crate::error::Result;

/// One page of the revocation feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevocationFeed {
    /// Records ordered by `recorded_at`, then insertion order.
    pub records: Vec<RevocationRecord>,
    /// Upper bound of the read. No record at or before this point can
    /// still appear.
    pub watermark: Timestamp,
}

impl RevocationFeed {
    /// Cursor to pass to the next `list_since`.
    ///
    /// Reads are inclusive, so resuming at the watermark may re-deliver
    /// records from that one second. Duplicates never change what a
    /// verifier rejects.
    pub fn next_cursor(&self) -> Timestamp {
        self.watermark
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl IntoIterator for RevocationFeed {
    type Item = RevocationRecord;
    type IntoIter = std::vec::IntoIter<RevocationRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

/// Outcome of a prune pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Records strictly older than this were eligible.
    pub cutoff: Timestamp,
    pub removed_records: u64,
    /// Whole time buckets dropped. Always zero for unpartitioned backends.
    pub removed_partitions: u64,
}

/// The RevocationStore trait: async interface for revocation persistence.
///
/// Stores are internally synchronized and meant to be shared behind an
/// `Arc`. No method holds a lock across an `.await`.
///
/// # Design Notes
///
/// - **No deduplication**: appending the same fact twice stores two records.
/// - **Watermark-bounded reads**: `list_since` never returns a record newer
///   than the watermark it reports, and the watermark never moves backwards.
/// - **Failures are loud**: a backend failure is an error, never an empty feed.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Short backend name for logs and health reports.
    fn backend(&self) -> &'static str;

    /// Digest `fact`, stamp it with `recorded_at`, and persist it.
    ///
    /// `recorded_at` never decreases within one store, and is never below a
    /// watermark the store has already reported.
    async fn append(&self, fact: RevocationWriteFact) -> Result<RevocationRecord>;

    /// Every record with `cursor <= recorded_at <= watermark`.
    ///
    /// A backend may clamp a cursor ahead of the watermark down to it. The
    /// SQLite backend does, so `list_since(t + 1)` can still return records
    /// at `t` while the watermark sits on `t`. Those are duplicates of what
    /// an earlier read already delivered.
    async fn list_since(&self, cursor: Timestamp) -> Result<RevocationFeed>;

    /// Remove records older than `watermark - retention`.
    ///
    /// Idempotent for a fixed clock.
    async fn prune(&self, retention: Duration) -> Result<PruneReport>;

    /// The current safe watermark.
    async fn watermark(&self) -> Result<Timestamp>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<()>;
}
