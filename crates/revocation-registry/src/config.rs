//! Registry configuration.
//!
//! Plain data with defaults. Reading it from files or the environment is the
//! host's job; every struct deserializes with serde and missing fields fall
//! back to [`Default`].

use std::path::PathBuf;
use std::time::Duration;

use revocation_registry_core::{HashAlgorithm, RevocationHasher, DEFAULT_SEPARATOR};
use revocation_registry_store::SqliteOptions;
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};

/// Top-level configuration for a [`Registry`](crate::Registry).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub store: StoreConfig,
    pub hashing: HashingConfig,
    pub retention: RetentionConfig,
}

impl RegistryConfig {
    /// Reject settings no backend can run with.
    pub fn validate(&self) -> Result<()> {
        if let StoreConfig::Sqlite {
            bucket_width_secs, ..
        } = &self.store
        {
            if *bucket_width_secs == 0 {
                return Err(RegistryError::Config(
                    "store.bucket_width_secs must be at least 1".into(),
                ));
            }
        }
        if self.retention.prune_interval_secs == 0 {
            return Err(RegistryError::Config(
                "retention.prune_interval_secs must be at least 1".into(),
            ));
        }
        if self.hashing.separator.is_alphanumeric() {
            return Err(RegistryError::Config(format!(
                "hashing.separator {:?} would be ambiguous inside claim values",
                self.hashing.separator
            )));
        }
        Ok(())
    }
}

/// Which backend holds the revocation log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StoreConfig {
    /// Process-local, lost on restart.
    #[default]
    Memory,
    /// Durable SQLite file partitioned into time buckets.
    Sqlite {
        path: PathBuf,
        #[serde(default = "default_bucket_width_secs")]
        bucket_width_secs: u64,
        #[serde(default = "default_visibility_window_secs")]
        write_visibility_window_secs: u64,
    },
}

impl StoreConfig {
    /// SQLite backend at `path` with default partitioning.
    pub fn sqlite(path: impl Into<PathBuf>) -> Self {
        StoreConfig::Sqlite {
            path: path.into(),
            bucket_width_secs: default_bucket_width_secs(),
            write_visibility_window_secs: default_visibility_window_secs(),
        }
    }

    pub(crate) fn sqlite_options(bucket_width_secs: u64, window_secs: u64) -> SqliteOptions {
        SqliteOptions {
            bucket_width: Duration::from_secs(bucket_width_secs),
            write_visibility_window: Duration::from_secs(window_secs),
        }
    }
}

fn default_bucket_width_secs() -> u64 {
    revocation_registry_store::DEFAULT_BUCKET_WIDTH.as_secs()
}

fn default_visibility_window_secs() -> u64 {
    revocation_registry_store::DEFAULT_VISIBILITY_WINDOW.as_secs()
}

/// How tokens and claim values are digested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashingConfig {
    pub algorithm: HashAlgorithm,
    pub separator: char,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::default(),
            separator: DEFAULT_SEPARATOR,
        }
    }
}

impl HashingConfig {
    pub fn hasher(&self) -> RevocationHasher {
        RevocationHasher::new(self.algorithm, self.separator)
    }
}

/// How long records are kept and how often expired ones are removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Longest lifetime of any credential a verifier may still accept.
    /// Records older than this can no longer affect a decision.
    pub max_credential_lifetime_secs: u64,
    pub prune_interval_secs: u64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            max_credential_lifetime_secs: 86_400,
            prune_interval_secs: 300,
        }
    }
}

impl RetentionConfig {
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.max_credential_lifetime_secs)
    }

    pub fn prune_interval(&self) -> Duration {
        Duration::from_secs(self.prune_interval_secs)
    }
}
