//! Eveil - content, progression and caching engine
//!
//! Serves generated challenges, student progression and recommendations
//! over HTTP, caching hot reads in Redis with an in-process fallback.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eveil::api::{create_router, AppState};
use eveil::cache::{CacheLayer, CacheSettings, CacheStats};
use eveil::clock::{Clock, SystemClock};
use eveil::config::Config;
use eveil::progress::{InMemoryProgressStore, ProgressStore, RetryingStore};
use eveil::tasks::spawn_cleanup_task;

/// Main entry point for the engine.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect the cache layer (Redis or in-process fallback)
/// 4. Generate the catalog and wire the engine
/// 5. Start background fallback sweep task
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eveil=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Eveil engine");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, namespace={}, default_ttl={}s, cleanup_interval={}s",
        config.server_port, config.cache_namespace, config.cache_default_ttl, config.cleanup_interval
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let stats = Arc::new(CacheStats::new());
    let cache = Arc::new(
        CacheLayer::connect(
            config.redis_url.as_deref(),
            CacheSettings::from(&config),
            stats.clone(),
            clock.clone(),
        )
        .await,
    );
    info!("Cache layer ready (backend={})", cache.backend_name());

    let store: Arc<dyn ProgressStore> = Arc::new(RetryingStore::new(
        Arc::new(InMemoryProgressStore::new()),
        config.datastore_retries,
        Duration::from_millis(config.datastore_retry_backoff_ms),
    ));

    let state = AppState::build(&config, cache.clone(), stats, store, clock.clone());
    info!(
        "Catalog generated: {} challenges, {} exercises",
        state.catalog.len(),
        state.exercises.len()
    );

    let cleanup_handle = spawn_cleanup_task(cache.fallback(), clock, config.cleanup_interval);
    info!("Background sweep task started");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the sweep task and allows graceful shutdown.
async fn shutdown_signal(cleanup_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    cleanup_handle.abort();
    warn!("Sweep task aborted");
}
