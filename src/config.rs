//! Configuration Module
//!
//! Handles loading and managing engine configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Engine configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Redis connection URL; in-process cache only when unset
    pub redis_url: Option<String>,
    /// Namespace prepended to every cache key
    pub cache_namespace: String,
    /// Default TTL in seconds for cache writes without explicit TTL
    pub cache_default_ttl: u64,
    /// TTL in seconds for cached recommendation lists
    pub recommendation_ttl: u64,
    /// TTL in seconds for cached progress summaries
    pub progress_ttl: u64,
    /// Connect and per-operation timeout for the cache backend, in milliseconds
    pub cache_timeout_ms: u64,
    /// Fallback map size above which a write triggers an expiry sweep
    pub fallback_sweep_threshold: usize,
    /// Background sweep interval in seconds
    pub cleanup_interval: u64,
    /// Upper bound on the recommendation list length
    pub max_recommendations: usize,
    /// Cache operations slower than this are reported, in milliseconds
    pub slow_operation_ms: u64,
    /// Retries for transient datastore faults
    pub datastore_retries: u32,
    /// Linear backoff step between datastore retries, in milliseconds
    pub datastore_retry_backoff_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `REDIS_URL` - Redis URL (default: unset, in-process cache)
    /// - `CACHE_NAMESPACE` - Cache key namespace (default: eveil)
    /// - `CACHE_DEFAULT_TTL` - Default cache TTL in seconds (default: 300)
    /// - `RECOMMENDATION_TTL` - Recommendation cache TTL (default: 900)
    /// - `PROGRESS_TTL` - Progress summary cache TTL (default: 300)
    /// - `CACHE_TIMEOUT_MS` - Cache backend timeout (default: 250)
    /// - `FALLBACK_SWEEP_THRESHOLD` - Opportunistic sweep threshold (default: 1000)
    /// - `CLEANUP_INTERVAL` - Background sweep interval in seconds (default: 60)
    /// - `MAX_RECOMMENDATIONS` - Recommendation cap (default: 20)
    /// - `SLOW_OPERATION_MS` - Slow cache operation threshold (default: 50)
    /// - `DATASTORE_RETRIES` - Transient datastore retries (default: 3)
    /// - `DATASTORE_RETRY_BACKOFF_MS` - Retry backoff step (default: 50)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_var("SERVER_PORT", defaults.server_port),
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
            cache_namespace: env::var("CACHE_NAMESPACE")
                .ok()
                .filter(|ns| !ns.is_empty())
                .unwrap_or(defaults.cache_namespace),
            cache_default_ttl: parse_var("CACHE_DEFAULT_TTL", defaults.cache_default_ttl),
            recommendation_ttl: parse_var("RECOMMENDATION_TTL", defaults.recommendation_ttl),
            progress_ttl: parse_var("PROGRESS_TTL", defaults.progress_ttl),
            cache_timeout_ms: parse_var("CACHE_TIMEOUT_MS", defaults.cache_timeout_ms),
            fallback_sweep_threshold: parse_var(
                "FALLBACK_SWEEP_THRESHOLD",
                defaults.fallback_sweep_threshold,
            ),
            cleanup_interval: parse_var("CLEANUP_INTERVAL", defaults.cleanup_interval),
            max_recommendations: parse_var("MAX_RECOMMENDATIONS", defaults.max_recommendations),
            slow_operation_ms: parse_var("SLOW_OPERATION_MS", defaults.slow_operation_ms),
            datastore_retries: parse_var("DATASTORE_RETRIES", defaults.datastore_retries),
            datastore_retry_backoff_ms: parse_var(
                "DATASTORE_RETRY_BACKOFF_MS",
                defaults.datastore_retry_backoff_ms,
            ),
        }
    }
}

fn parse_var<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            redis_url: None,
            cache_namespace: "eveil".to_string(),
            cache_default_ttl: 300,
            recommendation_ttl: 900,
            progress_ttl: 300,
            cache_timeout_ms: 250,
            fallback_sweep_threshold: 1000,
            cleanup_interval: 60,
            max_recommendations: 20,
            slow_operation_ms: 50,
            datastore_retries: 3,
            datastore_retry_backoff_ms: 50,
        }
    }
}
