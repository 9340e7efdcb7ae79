//! Background retention enforcement.
//!
//! A [`Pruner`] owns one tokio task that calls
//! [`RevocationStore::prune`] on a fixed interval until it is shut down.

use std::sync::Arc;
use std::time::Duration;

use revocation_registry_store::RevocationStore;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::error::{RegistryError, Result};

/// Handle to a running prune loop.
///
/// Dropping the handle without calling [`Pruner::shutdown`] detaches the
/// task: it keeps pruning until the runtime stops.
#[must_use = "dropping the handle detaches the pruner; call `shutdown` to stop it"]
pub struct Pruner {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Pruner {
    /// Start pruning `store` every `interval`, keeping `retention` worth of
    /// records behind the watermark. The first pass runs immediately.
    ///
    /// Fails if `interval` is zero.
    pub fn spawn(
        store: Arc<dyn RevocationStore>,
        retention: Duration,
        interval: Duration,
    ) -> Result<Self> {
        if interval.is_zero() {
            return Err(RegistryError::Config(
                "prune interval must be greater than zero".into(),
            ));
        }
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            info!(
                backend = store.backend(),
                retention_secs = retention.as_secs(),
                interval_ms = interval.as_millis() as u64,
                "pruner started"
            );

            let mut detached = false;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    changed = shutdown_rx.changed(), if !detached => {
                        match changed {
                            Ok(()) if *shutdown_rx.borrow() => break,
                            Ok(()) => {}
                            Err(_) => {
                                debug!("pruner handle dropped; running detached");
                                detached = true;
                            }
                        }
                        continue;
                    }
                }

                match store.prune(retention).await {
                    Ok(report) => debug!(
                        cutoff = %report.cutoff,
                        removed = report.removed_records,
                        "prune cycle finished"
                    ),
                    Err(e) => warn!(error = %e, "prune cycle failed (will retry)"),
                }
            }

            info!("pruner stopped");
        });

        Ok(Self { shutdown, handle })
    }

    /// Signal the loop to stop and wait for it. A prune already in flight
    /// completes first.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            warn!(error = %e, "pruner task ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revocation_registry_core::{RevocationHasher, RevocationWriteFact, Timestamp};
    use revocation_registry_store::{ManualClock, MemoryStore};

    fn store_at(start: u64) -> (Arc<MemoryStore>, ManualClock) {
        let clock = ManualClock::new(Timestamp(start));
        let store = Arc::new(MemoryStore::with_clock(
            RevocationHasher::default(),
            Arc::new(clock.clone()),
        ));
        (store, clock)
    }

    async fn append_globals(store: &MemoryStore, clock: &ManualClock, times: &[u64]) {
        for &t in times {
            clock.set(Timestamp(t));
            store.append(RevocationWriteFact::global(t)).await.unwrap();
        }
    }

    async fn wait_for_len(store: &MemoryStore, want: usize) -> usize {
        let mut remaining = store.len().unwrap();
        for _ in 0..200 {
            if remaining == want {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
            remaining = store.len().unwrap();
        }
        remaining
    }

    #[tokio::test]
    async fn test_pruner_removes_expired_records_and_stops() {
        let (store, clock) = store_at(0);
        append_globals(&store, &clock, &[10, 20, 30]).await;
        clock.set(Timestamp(40));

        let pruner = Pruner::spawn(
            store.clone(),
            Duration::from_secs(25),
            Duration::from_millis(10),
        )
        .unwrap();

        assert_eq!(wait_for_len(&store, 2).await, 2);
        pruner.shutdown().await;
    }

    #[tokio::test]
    async fn test_dropped_handle_keeps_pruning() {
        let (store, clock) = store_at(0);
        let pruner = Pruner::spawn(
            store.clone(),
            Duration::from_secs(25),
            Duration::from_millis(10),
        )
        .unwrap();
        drop(pruner);
        tokio::time::sleep(Duration::from_millis(50)).await;

        append_globals(&store, &clock, &[10, 20, 30]).await;
        clock.set(Timestamp(40));

        assert_eq!(wait_for_len(&store, 2).await, 2);
    }

    #[tokio::test]
    async fn test_zero_interval_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let result = Pruner::spawn(store, Duration::from_secs(60), Duration::ZERO);
        assert!(matches!(result, Err(RegistryError::Config(_))));
    }

    #[tokio::test]
    async fn test_shutdown_before_first_record() {
        let store = Arc::new(MemoryStore::new());
        let pruner =
            Pruner::spawn(store, Duration::from_secs(60), Duration::from_secs(3600)).unwrap();
        pruner.shutdown().await;
    }
}
