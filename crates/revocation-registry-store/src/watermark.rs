//! Monotonic watermark tracking.

use std::sync::atomic::{AtomicU64, Ordering};

use revocation_registry_core::Timestamp;
use tracing::error;

use crate::error::{Result, StoreError};

/// Remembers the highest watermark a store has reported.
///
/// A poller resumes from the last watermark it saw. If a later read reported
/// an earlier one, records landing in between would be behind every
/// poller's cursor, so a regression is an error rather than a value.
#[derive(Debug, Default)]
pub struct WatermarkGuard {
    advertised: AtomicU64,
}

impl WatermarkGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest watermark reported so far.
    pub fn current(&self) -> Timestamp {
        Timestamp(self.advertised.load(Ordering::SeqCst))
    }

    /// Report `candidate` as the new watermark.
    pub fn advance(&self, candidate: Timestamp) -> Result<Timestamp> {
        let previous = self.advertised.fetch_max(candidate.0, Ordering::SeqCst);
        if candidate.0 < previous {
            error!(
                previous,
                current = candidate.0,
                "watermark regression; refusing to serve feed"
            );
            return Err(StoreError::WatermarkViolation {
                previous: Timestamp(previous),
                current: candidate,
            });
        }
        Ok(candidate)
    }
}
