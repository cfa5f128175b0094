//! Expiry Sweep Task
//!
//! Background task that periodically removes expired cache entries from a
//! shared cache.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{CacheStore, ExpiryItem, ExpiryQueue, ExpiryStructure};
use crate::clock::{TimeSource, WallClock};

// == Shared Cache ==
/// A cache behind one exclusive lock.
///
/// Every cache call mutates (reads refresh recency), so callers take the
/// write half for `get` as well as `set`.
pub type SharedCache<V, C = WallClock, S = ExpiryQueue<ExpiryItem>> =
    Arc<RwLock<CacheStore<V, C, S>>>;

/// Wraps a store for shared use.
pub fn share<V, C, S>(store: CacheStore<V, C, S>) -> SharedCache<V, C, S> {
    Arc::new(RwLock::new(store))
}

/// Spawns a background task that periodically sweeps expired entries.
///
/// The task sleeps for `interval_ms` between sweeps (at least one
/// millisecond) and holds the write lock only for the sweep itself.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort it during
/// shutdown.
///
/// # Example
/// ```ignore
/// let cache = share(CacheStore::<i64>::new(1000));
/// let sweep_handle = spawn_sweep_task(cache.clone(), 1000);
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task<V, C, S>(cache: SharedCache<V, C, S>, interval_ms: u64) -> JoinHandle<()>
where
    V: Send + Sync + 'static,
    C: TimeSource + Send + Sync + 'static,
    S: ExpiryStructure<ExpiryItem> + Send + Sync + 'static,
{
    let interval = Duration::from_millis(interval_ms.max(1));

    tokio::spawn(async move {
        info!(
            "Starting expiry sweep task with interval of {} ms",
            interval.as_millis()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut guard = cache.write().await;
                guard.evict_expired()
            };

            if removed > 0 {
                info!("Expiry sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiry sweep: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    #[tokio::test]
    async fn test_sweep_task_removes_expired_entries() {
        let clock = ManualClock::new();
        let cache = share(CacheStore::<i32, _>::with_clock(100, clock.clone()));

        {
            let mut guard = cache.write().await;
            guard.set("expire_soon", 1, 50, 1).unwrap();
            guard.set("long_lived", 2, 50, 3600).unwrap();
        }
        clock.advance_secs(2);

        let handle = spawn_sweep_task(cache.clone(), 10);
        tokio::time::sleep(Duration::from_millis(200)).await;

        {
            let guard = cache.read().await;
            assert_eq!(guard.keys(), vec!["long_lived"]);
            assert_eq!(guard.len(), 1);
        }

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_preserves_valid_entries() {
        let cache = share(CacheStore::<i32>::new(100));

        {
            let mut guard = cache.write().await;
            guard.set("long_lived", 7, 1, 3600).unwrap();
        }

        let handle = spawn_sweep_task(cache.clone(), 10);
        tokio::time::sleep(Duration::from_millis(100)).await;

        {
            let mut guard = cache.write().await;
            assert_eq!(guard.get("long_lived"), Some(7));
        }

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_can_be_aborted() {
        let cache = share(CacheStore::<i32>::new(100));

        let handle = spawn_sweep_task(cache, 1000);
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
