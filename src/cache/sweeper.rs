//! Background expiry sweep.
//!
//! # Responsibilities
//! - Periodically drop expired entries from every registered store
//! - Exit cleanly on shutdown

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time;

/// Stores the sweeper can drive without knowing their value type.
pub trait Sweep: Send + Sync {
    /// Tier label for logs.
    fn name(&self) -> &'static str;

    /// Remove expired entries, returning how many were dropped.
    fn sweep(&self) -> usize;
}

impl<V: Clone + Send> Sweep for super::store::TtlCache<V> {
    fn name(&self) -> &'static str {
        self.name()
    }

    fn sweep(&self) -> usize {
        self.sweep()
    }
}

/// Periodic sweeper over a set of cache stores.
pub struct CacheSweeper {
    stores: Vec<Arc<dyn Sweep>>,
    interval: Duration,
}

impl CacheSweeper {
    pub fn new(stores: Vec<Arc<dyn Sweep>>, interval: Duration) -> Self {
        Self { stores, interval }
    }

    /// Spawn the sweep loop onto the runtime.
    pub fn spawn(self) -> SweeperHandle {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let join = tokio::spawn(self.run(shutdown_rx));
        SweeperHandle { shutdown_tx, join }
    }

    async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            stores = self.stores.len(),
            "Cache sweeper starting"
        );

        let mut ticker = time::interval(self.interval);
        // The first tick fires immediately; skip it so a fresh gateway does
        // not sweep before anything can expire.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    for store in &self.stores {
                        let removed = store.sweep();
                        if removed > 0 {
                            tracing::debug!(cache = store.name(), removed, "Swept expired entries");
                        }
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Cache sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}

/// Handle to a running sweeper task.
pub struct SweeperHandle {
    shutdown_tx: broadcast::Sender<()>,
    join: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signal shutdown and wait for the task to exit.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(());
        let _ = self.join.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::store::TtlCache;

    #[tokio::test]
    async fn test_sweeper_drops_expired_entries() {
        let cache = Arc::new(TtlCache::new(
            "sweep-test",
            10,
            Duration::from_millis(20),
        ));
        cache.put("a".to_string(), 1u32);
        cache.put("b".to_string(), 2u32);

        let sweeper = CacheSweeper::new(
            vec![cache.clone() as Arc<dyn Sweep>],
            Duration::from_millis(25),
        );
        let handle = sweeper.spawn();

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(cache.len(), 0);

        handle.stop().await;
    }

    #[tokio::test]
    async fn test_stop_terminates_the_task() {
        let cache = Arc::new(TtlCache::<u32>::new("stop-test", 10, Duration::from_secs(60)));
        let sweeper = CacheSweeper::new(
            vec![cache as Arc<dyn Sweep>],
            Duration::from_secs(3600),
        );
        let handle = sweeper.spawn();

        // Returns promptly even though the ticker interval is an hour.
        tokio::time::timeout(Duration::from_secs(1), handle.stop())
            .await
            .expect("sweeper did not stop");
    }
}
