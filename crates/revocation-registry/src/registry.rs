//! The Registry: unified API for recording and serving revocations.
//!
//! The Registry picks a store once from configuration and exposes the
//! write path, the feed, health, and retention enforcement on top of it.

use std::sync::Arc;

use revocation_registry_core::{RevocationRecord, RevocationRequest, Timestamp};
use revocation_registry_store::{
    Clock, MemoryStore, PruneReport, RevocationFeed, RevocationStore, SqliteStore, SystemClock,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{RegistryConfig, StoreConfig};
use crate::error::Result;
use crate::poll::FeedPoller;
use crate::pruner::Pruner;

/// Liveness of the backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Up,
    Down,
}

/// Result of [`Registry::health`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub backend: &'static str,
    pub status: HealthStatus,
}

impl HealthReport {
    pub fn is_up(&self) -> bool {
        self.status == HealthStatus::Up
    }
}

/// The main Registry struct.
///
/// Cheap to clone; clones share the same store.
#[derive(Clone)]
pub struct Registry {
    /// The storage backend.
    store: Arc<dyn RevocationStore>,
    /// Configuration.
    config: RegistryConfig,
}

impl Registry {
    /// Build the store described by `config` and wrap it.
    ///
    /// Run once at startup. A SQLite store's file is created and migrated
    /// here, so configuration and schema problems surface before serving.
    pub fn from_config(config: RegistryConfig) -> Result<Self> {
        Self::from_config_with_clock(config, Arc::new(SystemClock))
    }

    /// Like [`Registry::from_config`], with an explicit time source.
    pub fn from_config_with_clock(config: RegistryConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        let hasher = config.hashing.hasher();

        let store: Arc<dyn RevocationStore> = match &config.store {
            StoreConfig::Memory => Arc::new(MemoryStore::with_clock(hasher, clock)),
            StoreConfig::Sqlite {
                path,
                bucket_width_secs,
                write_visibility_window_secs,
            } => Arc::new(SqliteStore::open_with(
                path,
                StoreConfig::sqlite_options(*bucket_width_secs, *write_visibility_window_secs),
                hasher,
                clock,
            )?),
        };

        info!(
            backend = store.backend(),
            algorithm = %hasher.algorithm(),
            "revocation store selected"
        );
        Ok(Self::new(store, config))
    }

    /// Wrap an already-built store.
    pub fn new(store: Arc<dyn RevocationStore>, config: RegistryConfig) -> Self {
        Self { store, config }
    }

    /// Get the store reference.
    pub fn store(&self) -> &Arc<dyn RevocationStore> {
        &self.store
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Write path
    // ─────────────────────────────────────────────────────────────────────────

    /// Record a revocation. The returned record is what pollers will see.
    pub async fn revoke(&self, request: RevocationRequest) -> Result<RevocationRecord> {
        let kind = request.kind();
        let record = self.store.append(request.fact).await?;
        debug!(?kind, recorded_at = %record.recorded_at, "revocation recorded");
        Ok(record)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Read path
    // ─────────────────────────────────────────────────────────────────────────

    /// Records with `recorded_at >= since`, as served to pollers.
    pub async fn revocations_since(&self, since: Timestamp) -> Result<Vec<RevocationRecord>> {
        Ok(self.feed_since(since).await?.records)
    }

    /// Like [`Registry::revocations_since`], keeping the watermark.
    pub async fn feed_since(&self, since: Timestamp) -> Result<RevocationFeed> {
        Ok(self.store.list_since(since).await?)
    }

    /// A cursor-tracking reader over this registry's feed.
    pub fn poller(&self, cursor: Timestamp) -> FeedPoller {
        FeedPoller::resume(self.store.clone(), cursor)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Maintenance
    // ─────────────────────────────────────────────────────────────────────────

    /// Drop records older than the configured credential lifetime.
    pub async fn prune(&self) -> Result<PruneReport> {
        Ok(self.store.prune(self.config.retention.retention()).await?)
    }

    /// Run [`Registry::prune`] in the background on the configured interval.
    #[must_use = "dropping the handle detaches the pruner; call `shutdown` to stop it"]
    pub fn start_pruner(&self) -> Result<Pruner> {
        Pruner::spawn(
            self.store.clone(),
            self.config.retention.retention(),
            self.config.retention.prune_interval(),
        )
    }

    /// Probe the backend.
    pub async fn health(&self) -> HealthReport {
        let status = match self.store.ping().await {
            Ok(()) => HealthStatus::Up,
            Err(e) => {
                warn!(backend = self.store.backend(), error = %e, "store health check failed");
                HealthStatus::Down
            }
        };
        HealthReport {
            backend: self.store.backend(),
            status,
        }
    }
}
