//! Priority Cache demo
//!
//! Walks a five-key cache down from capacity 5 to 1 and logs which key each
//! shrink evicts, and why.

use std::time::Duration;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use priority_cache::cache::{CacheStore, ExpiryItem, ExpiryStructure};
use priority_cache::{share, spawn_sweep_task, Config, ExpiryKind, SharedCache, WallClock};

/// Main entry point for the demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache over the configured expiry structure
/// 4. Start the background expiry sweep
/// 5. Run the walkthrough, then stop the sweep
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "priority_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: max_items={}, expiry_structure={:?}, block_size={}, sweep_interval={}ms",
        config.max_items, config.expiry_structure, config.block_size, config.sweep_interval_ms
    );

    match config.expiry_structure {
        ExpiryKind::Heap => {
            let cache = share(CacheStore::<i64>::new(config.max_items));
            walkthrough(cache, &config).await
        }
        ExpiryKind::Chunked => {
            let cache = share(CacheStore::<i64, _, _>::with_chunked_list(
                config.max_items,
                config.block_size,
                WallClock,
            ));
            walkthrough(cache, &config).await
        }
    }
}

async fn walkthrough<S>(cache: SharedCache<i64, WallClock, S>, config: &Config) -> anyhow::Result<()>
where
    S: ExpiryStructure<ExpiryItem> + Send + Sync + 'static,
{
    let sweep_handle = spawn_sweep_task(cache.clone(), config.sweep_interval_ms);

    {
        let mut store = cache.write().await;
        // key, value, priority, ttl seconds
        store.set("A", 1, 5, 100)?;
        store.set("B", 2, 15, 1)?;
        store.set("C", 3, 5, 10)?;
        store.set("D", 4, 1, 15)?;
        store.set("E", 5, 5, 150)?;
        store.get("C");

        store.set_max_items(5);
        info!("Keys at t=0 with room for 5: {:?}", store.keys());
    }

    tokio::time::sleep(Duration::from_secs(2)).await;

    let steps = [
        (4, "B expired"),
        (3, "D has the lowest priority"),
        (2, "A is the least recently used"),
        (1, "C was read more recently than E"),
    ];

    let mut store = cache.write().await;
    for (max_items, reason) in steps {
        store.set_max_items(max_items);
        info!(
            "Keys with room for {}: {:?} ({})",
            max_items,
            store.keys(),
            reason
        );
    }

    info!("Remaining entries: {}", serde_json::to_string(&store.snapshot())?);
    drop(store);

    sweep_handle.abort();
    info!("Walkthrough complete");
    Ok(())
}
