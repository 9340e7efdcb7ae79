//! Client-side feed polling.
//!
//! A [`FeedPoller`] keeps the cursor between reads so callers only ever see
//! each page once the store has moved its watermark past it. It also checks
//! that successive watermarks never move backwards, which catches a store
//! that was swapped for a lagging replica or restored from an old backup.

use std::sync::Arc;

use revocation_registry_core::{RevocationRecord, Timestamp};
use revocation_registry_store::RevocationStore;
use tracing::{debug, error};

use crate::error::{RegistryError, Result};

/// Stateful reader of the revocation feed.
pub struct FeedPoller {
    store: Arc<dyn RevocationStore>,
    cursor: Timestamp,
    last_watermark: Option<Timestamp>,
}

impl FeedPoller {
    /// Poll from the beginning of retained history.
    pub fn new(store: Arc<dyn RevocationStore>) -> Self {
        Self::resume(store, Timestamp::ZERO)
    }

    /// Continue from a cursor saved by an earlier session.
    pub fn resume(store: Arc<dyn RevocationStore>, cursor: Timestamp) -> Self {
        Self {
            store,
            cursor,
            last_watermark: None,
        }
    }

    /// Where the next poll starts. Persist this to resume later.
    pub fn cursor(&self) -> Timestamp {
        self.cursor
    }

    /// Fetch everything recorded since the previous poll.
    ///
    /// Reads are inclusive at the cursor, so a record written in the same
    /// second as the last watermark may be returned twice.
    pub async fn poll(&mut self) -> Result<Vec<RevocationRecord>> {
        let feed = self.store.list_since(self.cursor).await?;

        if let Some(previous) = self.last_watermark {
            if feed.watermark < previous {
                error!(
                    %previous,
                    current = %feed.watermark,
                    "feed watermark regressed between polls"
                );
                return Err(RegistryError::WatermarkViolation {
                    previous,
                    current: feed.watermark,
                });
            }
        }

        debug!(
            cursor = %self.cursor,
            watermark = %feed.watermark,
            count = feed.len(),
            "feed polled"
        );
        self.last_watermark = Some(feed.watermark);
        self.cursor = feed.next_cursor();
        Ok(feed.records)
    }
}
