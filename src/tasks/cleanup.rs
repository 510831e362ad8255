//! Fallback Sweep Task
//!
//! Background task that periodically removes expired entries from the
//! in-process fallback cache, on top of the lazy and threshold sweeps.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::MemoryStore;
use crate::clock::Clock;

/// Spawns a background task that periodically sweeps expired fallback entries.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_cleanup_task(
    store: Arc<RwLock<MemoryStore>>,
    clock: Arc<dyn Clock>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting fallback cache sweep with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut guard = store.write().await;
                guard.cleanup_expired(clock.now_ms())
            };

            if removed > 0 {
                info!("Fallback sweep: removed {} expired entries", removed);
            } else {
                debug!("Fallback sweep: no expired entries found");
            }
        }
    })
}
