//! Database schema migrations for SQLite.
//!
//! We use a simple versioned migration system. Each migration is a SQL string
//! that transforms the schema from version N to N+1.

use rusqlite::Connection;

use crate::clock::{Clock, SystemClock};
use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// This function is idempotent - it can be called multiple times safely.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    if current > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema version {} is newer than supported version {}",
            current, CURRENT_VERSION
        )));
    }

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, SystemClock.now().0 as i64],
            )?;
        }

        tx.commit()?;
    }

    Ok(())
}

/// Apply a specific migration version.
fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: time-bucketed revocation log.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Live partitions. A bucket covers [bucket * width, (bucket + 1) * width).
        CREATE TABLE revocation_buckets (
            bucket INTEGER PRIMARY KEY,
            created_at INTEGER NOT NULL
        );

        -- Revocation facts, digests only
        CREATE TABLE revocations (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,  -- insertion order, never reused
            bucket INTEGER NOT NULL,
            recorded_at INTEGER NOT NULL,           -- store-assigned, epoch seconds
            kind INTEGER NOT NULL,                  -- RevocationKind code
            issued_before INTEGER NOT NULL,
            hash_algorithm TEXT,                    -- NULL for GLOBAL
            digest BLOB,                            -- token or claim value digest
            claim_names BLOB,                       -- CBOR array of sorted names
            separator TEXT                          -- claim join character
        );

        -- Feed order within a partition
        CREATE UNIQUE INDEX idx_revocations_feed ON revocations(bucket, recorded_at, seq);
        "#,
    )?;

    Ok(())
}
