//! Strong type definitions shared across the registry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Seconds since the Unix epoch.
///
/// Used for `issued_before` cut-offs, the store-assigned `recorded_at`
/// and polling cursors. Serialized as a bare integer.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// The epoch itself. A cursor of `ZERO` reads the whole feed.
    pub const ZERO: Self = Self(0);

    /// Largest `issued_before` a revocation may carry. Every backend can
    /// store it as a signed 64-bit integer.
    pub const MAX_ISSUED_BEFORE: Self = Self(i64::MAX as u64);

    /// Create a timestamp from epoch seconds.
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// Epoch seconds.
    pub const fn as_secs(&self) -> u64 {
        self.0
    }

    /// Move back by `d`, stopping at the epoch.
    pub fn saturating_sub(self, d: Duration) -> Self {
        Self(self.0.saturating_sub(d.as_secs()))
    }

    /// Move forward by `d`, stopping at `u64::MAX`.
    pub fn saturating_add(self, d: Duration) -> Self {
        Self(self.0.saturating_add(d.as_secs()))
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Timestamp {
    fn from(secs: u64) -> Self {
        Self(secs)
    }
}
