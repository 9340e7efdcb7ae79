//! In-memory implementation of the RevocationStore trait.
//!
//! Single process, no replication lag: the watermark is the clock's `now`
//! and `list_since` is exact. Nothing survives a restart.

use std::collections::VecDeque;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use revocation_registry_core::{RevocationHasher, RevocationRecord, RevocationWriteFact, Timestamp};

use crate::clock::{Clock, SystemClock};
use crate::error::{Result, StoreError};
use crate::traits::{PruneReport, RevocationFeed, RevocationStore};
use crate::watermark::WatermarkGuard;

/// In-memory store implementation.
///
/// An append-only log ordered by `recorded_at`, behind one RwLock.
pub struct MemoryStore {
    hasher: RevocationHasher,
    clock: Arc<dyn Clock>,
    watermark: WatermarkGuard,
    log: RwLock<VecDeque<RevocationRecord>>,
}

impl MemoryStore {
    /// Create an empty store using the default hasher and the system clock.
    pub fn new() -> Self {
        Self::with_clock(RevocationHasher::default(), Arc::new(SystemClock))
    }

    pub fn with_clock(hasher: RevocationHasher, clock: Arc<dyn Clock>) -> Self {
        Self {
            hasher,
            clock,
            watermark: WatermarkGuard::new(),
            log: RwLock::new(VecDeque::new()),
        }
    }

    /// Number of records currently held.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, VecDeque<RevocationRecord>>> {
        self.log
            .read()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, VecDeque<RevocationRecord>>> {
        self.log
            .write()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {}", e)))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RevocationStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn append(&self, fact: RevocationWriteFact) -> Result<RevocationRecord> {
        let digested = self.hasher.digest_fact(&fact)?;

        let mut log = self.write()?;
        let last = log.back().map(|r| r.recorded_at).unwrap_or_default();
        let recorded_at = self.clock.now().max(last).max(self.watermark.current());

        let record = RevocationRecord::new(recorded_at, digested);
        log.push_back(record.clone());

        debug!(kind = %record.kind(), %recorded_at, "revocation appended");
        Ok(record)
    }

    async fn list_since(&self, cursor: Timestamp) -> Result<RevocationFeed> {
        let log = self.read()?;
        let watermark = self.watermark.advance(self.clock.now())?;

        let start = log.partition_point(|r| r.recorded_at < cursor);
        let records: Vec<RevocationRecord> = log
            .range(start..)
            .take_while(|r| r.recorded_at <= watermark)
            .cloned()
            .collect();

        debug!(%cursor, %watermark, count = records.len(), "feed read");
        Ok(RevocationFeed { records, watermark })
    }

    async fn prune(&self, retention: Duration) -> Result<PruneReport> {
        let mut log = self.write()?;
        let watermark = self.watermark.advance(self.clock.now())?;
        let cutoff = watermark.saturating_sub(retention);

        let mut removed = 0u64;
        while log.front().is_some_and(|r| r.recorded_at < cutoff) {
            log.pop_front();
            removed += 1;
        }

        if removed > 0 {
            info!(%cutoff, removed, "pruned expired revocations");
        }
        Ok(PruneReport {
            cutoff,
            removed_records: removed,
            removed_partitions: 0,
        })
    }

    async fn watermark(&self) -> Result<Timestamp> {
        let _log = self.read()?;
        self.watermark.advance(self.clock.now())
    }

    async fn ping(&self) -> Result<()> {
        self.read().map(|_| ())
    }
}
