//! SQLite implementation of the RevocationStore trait.
//!
//! This is the durable backend. Rows are partitioned into fixed-width time
//! buckets keyed by `recorded_at / bucket_width`:
//!
//! - `append` writes into the bucket matching its `recorded_at`.
//! - `list_since` walks live buckets from the cursor's bucket up to the
//!   watermark's bucket, concatenating each bucket's rows in
//!   `(recorded_at, seq)` order.
//! - `prune` drops whole buckets that lie entirely below the cutoff.
//!
//! The watermark trails the clock by `write_visibility_window`, which bounds
//! clock skew and replication delay between writers. Reads never go past it.
//!
//! rusqlite is synchronous; every operation runs on `spawn_blocking` with the
//! connection mutex held only inside the blocking closure.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{params, Connection};
use tracing::{debug, info};

use revocation_registry_core::{
    Digest, HashAlgorithm, RevocationHasher, RevocationKind, RevocationReadFact, RevocationRecord,
    RevocationWriteFact, RevokedClaimsInfo, RevokedGlobal, RevokedTokenInfo, Timestamp,
};

use crate::clock::{Clock, SystemClock};
use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{PruneReport, RevocationFeed, RevocationStore};
use crate::watermark::WatermarkGuard;

/// Default bucket width: one hour.
pub const DEFAULT_BUCKET_WIDTH: Duration = Duration::from_secs(3600);

/// Default write visibility window.
pub const DEFAULT_VISIBILITY_WINDOW: Duration = Duration::from_secs(5);

/// Partitioning and visibility settings for [`SqliteStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqliteOptions {
    /// Width of one time bucket. Must be at least one second.
    pub bucket_width: Duration,
    /// How far the watermark trails the clock.
    pub write_visibility_window: Duration,
}

impl Default for SqliteOptions {
    fn default() -> Self {
        Self {
            bucket_width: DEFAULT_BUCKET_WIDTH,
            write_visibility_window: DEFAULT_VISIBILITY_WINDOW,
        }
    }
}

impl SqliteOptions {
    fn bucket_width_secs(&self) -> u64 {
        self.bucket_width.as_secs()
    }

    fn bucket_of(&self, t: Timestamp) -> u64 {
        t.0 / self.bucket_width_secs()
    }
}

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    shared: Arc<Shared>,
}

struct Shared {
    db: Mutex<Db>,
    clock: Arc<dyn Clock>,
    watermark: WatermarkGuard,
    hasher: RevocationHasher,
    options: SqliteOptions,
}

struct Db {
    conn: Connection,
    /// Highest `recorded_at` ever written through this store.
    last_recorded_at: Timestamp,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>, options: SqliteOptions) -> Result<Self> {
        Self::open_with(
            path,
            options,
            RevocationHasher::default(),
            Arc::new(SystemClock),
        )
    }

    /// Open a database file with an explicit hasher and clock.
    pub fn open_with(
        path: impl AsRef<Path>,
        options: SqliteOptions,
        hasher: RevocationHasher,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn, options, hasher, clock)
    }

    /// Open an in-memory SQLite database with default settings.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        Self::open_memory_with(
            SqliteOptions::default(),
            RevocationHasher::default(),
            Arc::new(SystemClock),
        )
    }

    /// In-memory database with explicit settings.
    pub fn open_memory_with(
        options: SqliteOptions,
        hasher: RevocationHasher,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?, options, hasher, clock)
    }

    /// Wrap an open connection, migrating its schema first.
    pub fn from_connection(
        mut conn: Connection,
        options: SqliteOptions,
        hasher: RevocationHasher,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        if options.bucket_width_secs() == 0 {
            return Err(StoreError::Config(
                "bucket width must be at least one second".into(),
            ));
        }

        migration::migrate(&mut conn)?;

        let last: i64 = conn.query_row(
            "SELECT COALESCE(MAX(recorded_at), 0) FROM revocations",
            [],
            |row| row.get(0),
        )?;

        Ok(Self {
            shared: Arc::new(Shared {
                db: Mutex::new(Db {
                    conn,
                    last_recorded_at: from_sql_int(last, "recorded_at")?,
                }),
                clock,
                watermark: WatermarkGuard::new(),
                hasher,
                options,
            }),
        })
    }

    pub fn options(&self) -> SqliteOptions {
        self.shared.options
    }

    /// Run `f` against the connection on the blocking pool.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Shared, &mut Db) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let shared = self.shared.clone();

        tokio::task::spawn_blocking(move || {
            let mut db = shared
                .db
                .lock()
                .map_err(|e| StoreError::Unavailable(format!("mutex poisoned: {}", e)))?;
            f(&*shared, &mut *db)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("spawn_blocking failed: {}", e)))?
    }
}

impl Shared {
    fn next_watermark(&self) -> Result<Timestamp> {
        let candidate = self
            .clock
            .now()
            .saturating_sub(self.options.write_visibility_window);
        self.watermark.advance(candidate)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Row encoding
// ─────────────────────────────────────────────────────────────────────────────

/// Column values of one `revocations` row, before validation.
struct StoredRow {
    recorded_at: i64,
    kind: u8,
    issued_before: i64,
    hash_algorithm: Option<String>,
    digest: Option<Vec<u8>>,
    claim_names: Option<Vec<u8>>,
    separator: Option<String>,
}

impl StoredRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            recorded_at: row.get("recorded_at")?,
            kind: row.get("kind")?,
            issued_before: row.get("issued_before")?,
            hash_algorithm: row.get("hash_algorithm")?,
            digest: row.get("digest")?,
            claim_names: row.get("claim_names")?,
            separator: row.get("separator")?,
        })
    }

    fn into_record(self) -> Result<RevocationRecord> {
        let recorded_at = from_sql_int(self.recorded_at, "recorded_at")?;
        let issued_before = from_sql_int(self.issued_before, "issued_before")?;
        let kind = RevocationKind::from_code(self.kind)
            .map_err(|e| StoreError::InvalidData(e.to_string()))?;

        let fact = match kind {
            RevocationKind::Token => RevocationReadFact::Token(RevokedTokenInfo {
                token_hash: Digest(required(self.digest, "digest")?),
                hash_algorithm: parse_algorithm(self.hash_algorithm)?,
                issued_before,
            }),
            RevocationKind::ClaimSet => {
                let names_cbor = required(self.claim_names, "claim_names")?;
                let names: Vec<String> = ciborium::from_reader(&names_cbor[..])
                    .map_err(|e| StoreError::InvalidData(format!("claim_names: {}", e)))?;
                RevocationReadFact::ClaimSet(RevokedClaimsInfo {
                    names,
                    value_hash: Digest(required(self.digest, "digest")?),
                    hash_algorithm: parse_algorithm(self.hash_algorithm)?,
                    separator: parse_separator(self.separator)?,
                    issued_before,
                })
            }
            RevocationKind::Global => RevocationReadFact::Global(RevokedGlobal { issued_before }),
        };

        Ok(RevocationRecord::new(recorded_at, fact))
    }
}

/// Columns for a fact: (hash_algorithm, digest, claim_names, separator).
type FactColumns = (Option<&'static str>, Option<Vec<u8>>, Option<Vec<u8>>, Option<String>);

fn fact_columns(fact: &RevocationReadFact) -> Result<FactColumns> {
    match fact {
        RevocationReadFact::Token(t) => Ok((
            Some(t.hash_algorithm.as_str()),
            Some(t.token_hash.0.clone()),
            None,
            None,
        )),
        RevocationReadFact::ClaimSet(c) => Ok((
            Some(c.hash_algorithm.as_str()),
            Some(c.value_hash.0.clone()),
            Some(encode_names(&c.names)?),
            Some(c.separator.to_string()),
        )),
        RevocationReadFact::Global(_) => Ok((None, None, None, None)),
    }
}

fn encode_names(names: &[String]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(names, &mut buf)
        .map_err(|e| StoreError::Serialization(format!("claim_names: {}", e)))?;
    Ok(buf)
}

fn required<T>(value: Option<T>, column: &str) -> Result<T> {
    value.ok_or_else(|| StoreError::InvalidData(format!("missing {}", column)))
}

fn parse_algorithm(value: Option<String>) -> Result<HashAlgorithm> {
    required(value, "hash_algorithm")?
        .parse()
        .map_err(|e: revocation_registry_core::CoreError| StoreError::InvalidData(e.to_string()))
}

fn parse_separator(value: Option<String>) -> Result<char> {
    let s = required(value, "separator")?;
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(StoreError::InvalidData(format!(
            "separator must be one character, got {:?}",
            s
        ))),
    }
}

fn to_sql_int(value: u64, column: &str) -> Result<i64> {
    i64::try_from(value)
        .map_err(|_| StoreError::InvalidData(format!("{} out of range: {}", column, value)))
}

fn from_sql_int(value: i64, column: &str) -> Result<Timestamp> {
    u64::try_from(value)
        .map(Timestamp)
        .map_err(|_| StoreError::InvalidData(format!("negative {}: {}", column, value)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Store implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl RevocationStore for SqliteStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn append(&self, fact: RevocationWriteFact) -> Result<RevocationRecord> {
        // Digest before touching the blocking pool; raw input stops here.
        let digested = self.shared.hasher.digest_fact(&fact)?;
        drop(fact);

        let record = self
            .blocking(move |shared, db| {
                let recorded_at = shared
                    .clock
                    .now()
                    .max(db.last_recorded_at)
                    .max(shared.watermark.current());
                let bucket = shared.options.bucket_of(recorded_at);
                let (algorithm, digest, names, separator) = fact_columns(&digested)?;

                let tx = db.conn.transaction()?;
                tx.execute(
                    "INSERT OR IGNORE INTO revocation_buckets (bucket, created_at) VALUES (?1, ?2)",
                    params![
                        to_sql_int(bucket, "bucket")?,
                        to_sql_int(recorded_at.0, "created_at")?
                    ],
                )?;
                tx.execute(
                    "INSERT INTO revocations (
                        bucket, recorded_at, kind, issued_before,
                        hash_algorithm, digest, claim_names, separator
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        to_sql_int(bucket, "bucket")?,
                        to_sql_int(recorded_at.0, "recorded_at")?,
                        digested.kind().code(),
                        to_sql_int(digested.issued_before().0, "issued_before")?,
                        algorithm,
                        digest,
                        names,
                        separator,
                    ],
                )?;
                tx.commit()?;

                db.last_recorded_at = recorded_at;
                Ok(RevocationRecord::new(recorded_at, digested))
            })
            .await?;

        debug!(
            kind = %record.kind(),
            recorded_at = %record.recorded_at,
            "revocation appended"
        );
        Ok(record)
    }

    async fn list_since(&self, cursor: Timestamp) -> Result<RevocationFeed> {
        let feed = self
            .blocking(move |shared, db| {
                let watermark = shared.next_watermark()?;
                let lower = cursor.min(watermark);
                let first_bucket = shared.options.bucket_of(lower);
                let last_bucket = shared.options.bucket_of(watermark);

                let buckets: Vec<i64> = {
                    let mut stmt = db.conn.prepare(
                        "SELECT bucket FROM revocation_buckets
                         WHERE bucket >= ?1 AND bucket <= ?2
                         ORDER BY bucket",
                    )?;
                    let rows = stmt.query_map(
                        params![
                            to_sql_int(first_bucket, "bucket")?,
                            to_sql_int(last_bucket, "bucket")?
                        ],
                        |row| row.get(0),
                    )?;
                    rows.collect::<rusqlite::Result<Vec<_>>>()?
                };

                let mut stmt = db.conn.prepare(
                    "SELECT recorded_at, kind, issued_before, hash_algorithm, digest,
                            claim_names, separator
                     FROM revocations
                     WHERE bucket = ?1 AND recorded_at >= ?2 AND recorded_at <= ?3
                     ORDER BY recorded_at, seq",
                )?;

                let lower_sql = to_sql_int(lower.0, "cursor")?;
                let upper_sql = to_sql_int(watermark.0, "watermark")?;
                let mut records = Vec::new();
                for bucket in buckets {
                    let rows = stmt
                        .query_map(params![bucket, lower_sql, upper_sql], StoredRow::from_row)?
                        .collect::<rusqlite::Result<Vec<_>>>()?;
                    for row in rows {
                        records.push(row.into_record()?);
                    }
                }

                Ok(RevocationFeed { records, watermark })
            })
            .await?;

        debug!(
            %cursor,
            watermark = %feed.watermark,
            count = feed.len(),
            "feed read"
        );
        Ok(feed)
    }

    async fn prune(&self, retention: Duration) -> Result<PruneReport> {
        let report = self
            .blocking(move |shared, db| {
                let watermark = shared.next_watermark()?;
                let cutoff = watermark.saturating_sub(retention);
                // Buckets strictly below this one end at or before the cutoff.
                let horizon_bucket = to_sql_int(shared.options.bucket_of(cutoff), "bucket")?;

                let tx = db.conn.transaction()?;
                let removed_records = tx.execute(
                    "DELETE FROM revocations WHERE bucket < ?1",
                    params![horizon_bucket],
                )?;
                let removed_partitions = tx.execute(
                    "DELETE FROM revocation_buckets WHERE bucket < ?1",
                    params![horizon_bucket],
                )?;
                tx.commit()?;

                Ok(PruneReport {
                    cutoff,
                    removed_records: removed_records as u64,
                    removed_partitions: removed_partitions as u64,
                })
            })
            .await?;

        if report.removed_partitions > 0 {
            info!(
                cutoff = %report.cutoff,
                removed = report.removed_records,
                partitions = report.removed_partitions,
                "pruned expired revocation buckets"
            );
        }
        Ok(report)
    }

    async fn watermark(&self) -> Result<Timestamp> {
        self.blocking(|shared, _db| shared.next_watermark()).await
    }

    async fn ping(&self) -> Result<()> {
        self.blocking(|_shared, db| {
            db.conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
        .await
    }
}
