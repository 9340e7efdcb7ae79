//! Test fixtures and helpers.
//!
//! Stores wired to a [`ManualClock`], so tests decide every `recorded_at`.

use std::sync::Arc;
use std::time::Duration;

use revocation_registry_core::{RevocationHasher, RevocationRecord, RevocationWriteFact, Timestamp};
use revocation_registry_store::{
    ManualClock, MemoryStore, RevocationStore, Result, SqliteOptions, SqliteStore,
};

/// A store plus the clock that drives it.
pub struct TestFixture<S> {
    pub store: Arc<S>,
    pub clock: ManualClock,
}

impl<S> Clone for TestFixture<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            clock: self.clock.clone(),
        }
    }
}

impl TestFixture<MemoryStore> {
    /// In-memory store with its clock at `start`.
    pub fn memory(start: u64) -> Self {
        let clock = ManualClock::new(Timestamp(start));
        let store = MemoryStore::with_clock(RevocationHasher::default(), Arc::new(clock.clone()));
        Self {
            store: Arc::new(store),
            clock,
        }
    }
}

impl TestFixture<SqliteStore> {
    /// In-memory SQLite store with no visibility delay.
    pub fn sqlite(start: u64, bucket_width_secs: u64) -> Result<Self> {
        Self::sqlite_with(
            start,
            SqliteOptions {
                bucket_width: Duration::from_secs(bucket_width_secs),
                write_visibility_window: Duration::ZERO,
            },
        )
    }

    pub fn sqlite_with(start: u64, options: SqliteOptions) -> Result<Self> {
        let clock = ManualClock::new(Timestamp(start));
        let store = SqliteStore::open_memory_with(
            options,
            RevocationHasher::default(),
            Arc::new(clock.clone()),
        )?;
        Ok(Self {
            store: Arc::new(store),
            clock,
        })
    }
}

impl<S: RevocationStore + 'static> TestFixture<S> {
    /// The store as a trait object.
    pub fn dyn_store(&self) -> Arc<dyn RevocationStore> {
        self.store.clone()
    }

    /// Set the clock to `t` and append `fact`.
    pub async fn append_at(&self, t: u64, fact: RevocationWriteFact) -> Result<RevocationRecord> {
        self.clock.set(Timestamp(t));
        self.store.append(fact).await
    }

    /// Append a global revocation at each of `times`, in order.
    pub async fn append_globals_at(&self, times: &[u64]) -> Result<Vec<RevocationRecord>> {
        let mut records = Vec::with_capacity(times.len());
        for &t in times {
            records.push(self.append_at(t, RevocationWriteFact::global(t)).await?);
        }
        Ok(records)
    }
}
