//! Cache Layer Module
//!
//! Namespaced, TTL-bound JSON cache in front of Redis. When Redis cannot be
//! reached at startup, or a call errors or times out, the layer serves the
//! request from the in-process fallback map instead. Callers never see those
//! failures.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use redis::aio::ConnectionManager;
use redis::RedisResult;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cache::{CacheMetrics, MemoryStore};
use crate::clock::Clock;
use crate::config::Config;

/// Keys requested per `SCAN` page.
const SCAN_PAGE_SIZE: usize = 100;

// == Scope ==
/// Secondary key prefix separating unrelated cached entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheScope {
    Global,
    Student,
    Content,
}

impl CacheScope {
    fn prefix(self) -> Option<&'static str> {
        match self {
            CacheScope::Global => None,
            CacheScope::Student => Some("student"),
            CacheScope::Content => Some("content"),
        }
    }
}

enum Backend {
    Redis(ConnectionManager),
    Memory,
}

/// Settings the layer needs out of [`Config`].
#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub namespace: String,
    pub default_ttl: u64,
    pub timeout: Duration,
    pub slow_threshold: Duration,
    pub sweep_threshold: usize,
}

impl From<&Config> for CacheSettings {
    fn from(config: &Config) -> Self {
        Self {
            namespace: config.cache_namespace.clone(),
            default_ttl: config.cache_default_ttl,
            timeout: Duration::from_millis(config.cache_timeout_ms),
            slow_threshold: Duration::from_millis(config.slow_operation_ms),
            sweep_threshold: config.fallback_sweep_threshold,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

// == Cache Layer ==
pub struct CacheLayer {
    settings: CacheSettings,
    backend: Backend,
    fallback: Arc<RwLock<MemoryStore>>,
    metrics: Arc<dyn CacheMetrics>,
    clock: Arc<dyn Clock>,
}

impl CacheLayer {
    /// Connects to Redis when `redis_url` is set, falling back to the
    /// in-process map if it is unset or unreachable within the timeout.
    pub async fn connect(
        redis_url: Option<&str>,
        settings: CacheSettings,
        metrics: Arc<dyn CacheMetrics>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let backend = match redis_url {
            Some(url) => match connect_redis(url, settings.timeout).await {
                Ok(connection) => {
                    info!("Cache backend connected at {}", url);
                    Backend::Redis(connection)
                }
                Err(reason) => {
                    warn!("Cache backend unavailable ({}), using in-process cache", reason);
                    Backend::Memory
                }
            },
            None => {
                info!("No cache backend configured, using in-process cache");
                Backend::Memory
            }
        };

        Self::with_backend(backend, settings, metrics, clock)
    }

    /// Creates a layer that only uses the in-process map.
    pub fn in_memory(
        settings: CacheSettings,
        metrics: Arc<dyn CacheMetrics>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_backend(Backend::Memory, settings, metrics, clock)
    }

    fn with_backend(
        backend: Backend,
        settings: CacheSettings,
        metrics: Arc<dyn CacheMetrics>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let fallback = Arc::new(RwLock::new(MemoryStore::new(settings.sweep_threshold)));
        Self {
            settings,
            backend,
            fallback,
            metrics,
            clock,
        }
    }

    /// `"redis"` or `"memory"`.
    pub fn backend_name(&self) -> &'static str {
        match self.backend {
            Backend::Redis(_) => "redis",
            Backend::Memory => "memory",
        }
    }

    /// Shared handle to the fallback map, for the periodic sweep task.
    pub fn fallback(&self) -> Arc<RwLock<MemoryStore>> {
        self.fallback.clone()
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    /// `<namespace>[:<scope>]:<key>`
    pub fn build_key(&self, scope: CacheScope, key: &str) -> String {
        match scope.prefix() {
            Some(prefix) => format!("{}:{}:{}", self.settings.namespace, prefix, key),
            None => format!("{}:{}", self.settings.namespace, key),
        }
    }

    // == Get ==
    /// Reads and decodes a value. Missing, expired and corrupted entries are
    /// all misses; corrupted ones are removed.
    pub async fn get<T: DeserializeOwned>(&self, scope: CacheScope, key: &str) -> Option<T> {
        let full_key = self.build_key(scope, key);
        let started = Instant::now();
        let raw = self.read_raw(&full_key).await;
        self.observe("get", started);

        let Some(raw) = raw else {
            self.metrics.record_miss(&full_key);
            return None;
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                self.metrics.record_hit(&full_key);
                Some(value)
            }
            Err(e) => {
                warn!("Corrupted cache entry {}: {}, purging", full_key, e);
                self.delete_raw(&full_key).await;
                self.metrics.record_miss(&full_key);
                None
            }
        }
    }

    // == Set ==
    /// Encodes and stores a value for `ttl_seconds` (default TTL when `None`).
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        scope: CacheScope,
        key: &str,
        value: &T,
        ttl_seconds: Option<u64>,
    ) {
        let full_key = self.build_key(scope, key);
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Value for {} is not serializable: {}", full_key, e);
                return;
            }
        };
        let ttl = ttl_seconds.unwrap_or(self.settings.default_ttl).max(1);

        let started = Instant::now();
        self.write_raw(full_key, raw, ttl).await;
        self.observe("set", started);
    }

    /// Stores raw text without JSON encoding. Reading it back as a type that
    /// does not parse behaves like a corrupted entry.
    pub async fn set_raw(&self, scope: CacheScope, key: &str, raw: &str, ttl_seconds: Option<u64>) {
        let full_key = self.build_key(scope, key);
        let ttl = ttl_seconds.unwrap_or(self.settings.default_ttl).max(1);
        self.write_raw(full_key, raw.to_string(), ttl).await;
    }

    // == Delete ==
    /// Removes one key. Returns whether anything was removed.
    pub async fn delete(&self, scope: CacheScope, key: &str) -> bool {
        let full_key = self.build_key(scope, key);
        let started = Instant::now();
        let removed = self.delete_raw(&full_key).await;
        self.observe("delete", started);
        removed > 0
    }

    // == Invalidate Pattern ==
    /// Removes every key under `scope` matching the glob `pattern`.
    /// Returns the number of keys removed.
    pub async fn invalidate_pattern(&self, scope: CacheScope, pattern: &str) -> usize {
        let full_pattern = self.build_key(scope, pattern);
        let started = Instant::now();

        let mut removed = 0;
        if let Backend::Redis(connection) = &self.backend {
            let keys = self.scan_keys(connection, &full_pattern).await;
            if !keys.is_empty() {
                removed += self
                    .redis_call::<usize, _, _>("del", connection, |mut conn| async move {
                        redis::cmd("DEL").arg(keys).query_async(&mut conn).await
                    })
                    .await
                    .unwrap_or(0);
            }
        }
        removed += self.fallback.write().await.delete_matching(&full_pattern);

        self.observe("invalidate", started);
        debug!("Invalidated {} cache entries matching {}", removed, full_pattern);
        removed
    }

    // == Backend plumbing ==
    async fn read_raw(&self, full_key: &str) -> Option<String> {
        if let Backend::Redis(connection) = &self.backend {
            let key = full_key.to_string();
            let result = self
                .redis_call::<Option<String>, _, _>("get", connection, |mut conn| async move {
                    redis::cmd("GET").arg(key).query_async(&mut conn).await
                })
                .await;
            if let Some(value) = result {
                return value;
            }
        }
        let now = self.clock.now_ms();
        self.fallback.write().await.get(full_key, now)
    }

    async fn write_raw(&self, full_key: String, raw: String, ttl: u64) {
        if let Backend::Redis(connection) = &self.backend {
            let (key, value) = (full_key.clone(), raw.clone());
            let stored = self
                .redis_call::<(), _, _>("set", connection, |mut conn| async move {
                    redis::cmd("SET")
                        .arg(key)
                        .arg(value)
                        .arg("EX")
                        .arg(ttl)
                        .query_async(&mut conn)
                        .await
                })
                .await;
            if stored.is_some() {
                return;
            }
        }
        let now = self.clock.now_ms();
        self.fallback.write().await.set(full_key, raw, ttl, now);
    }

    /// Deletes from Redis (when connected) and from the fallback map, so a
    /// value written during an outage cannot resurface later.
    async fn delete_raw(&self, full_key: &str) -> usize {
        let mut removed = 0;
        if let Backend::Redis(connection) = &self.backend {
            let key = full_key.to_string();
            removed += self
                .redis_call::<usize, _, _>("del", connection, |mut conn| async move {
                    redis::cmd("DEL").arg(key).query_async(&mut conn).await
                })
                .await
                .unwrap_or(0);
        }
        if self.fallback.write().await.delete(full_key) {
            removed += 1;
        }
        removed
    }

    /// Collects keys matching `pattern` with cursor-driven `SCAN`, so Redis
    /// is never blocked for the whole keyspace.
    async fn scan_keys(&self, connection: &ConnectionManager, pattern: &str) -> Vec<String> {
        scan_all(move |cursor| {
            let pattern = pattern.to_string();
            self.redis_call::<(u64, Vec<String>), _, _>("scan", connection, move |mut conn| async move {
                redis::cmd("SCAN")
                    .arg(cursor)
                    .arg("MATCH")
                    .arg(pattern)
                    .arg("COUNT")
                    .arg(SCAN_PAGE_SIZE)
                    .query_async(&mut conn)
                    .await
            })
        })
        .await
    }

    /// Runs one Redis call under the operation timeout. `None` means the
    /// caller should use the fallback map.
    async fn redis_call<T, F, Fut>(
        &self,
        operation: &'static str,
        connection: &ConnectionManager,
        call: F,
    ) -> Option<T>
    where
        F: FnOnce(ConnectionManager) -> Fut,
        Fut: Future<Output = RedisResult<T>>,
    {
        match tokio::time::timeout(self.settings.timeout, call(connection.clone())).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                warn!(operation, error = %e, "Cache backend call failed, using in-process cache");
                None
            }
            Err(_) => {
                warn!(operation, "Cache backend call timed out, using in-process cache");
                None
            }
        }
    }

    fn observe(&self, operation: &str, started: Instant) {
        let elapsed = started.elapsed();
        if elapsed > self.settings.slow_threshold {
            self.metrics.record_slow_operation(operation, elapsed);
        }
    }
}

async fn connect_redis(url: &str, timeout: Duration) -> Result<ConnectionManager, String> {
    let client = redis::Client::open(url).map_err(|e| e.to_string())?;
    match tokio::time::timeout(timeout, client.get_connection_manager()).await {
        Ok(Ok(connection)) => Ok(connection),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!("connection timed out after {:?}", timeout)),
    }
}

// == Unit Tests ==
/// Follows a `SCAN` cursor from 0 until it returns to 0, stopping early if a
/// page cannot be fetched. Keys may repeat across pages.
async fn scan_all<F, Fut>(mut fetch: F) -> Vec<String>
where
    F: FnMut(u64) -> Fut,
    Fut: Future<Output = Option<(u64, Vec<String>)>>,
{
    let mut keys = Vec::new();
    let mut cursor = 0;
    while let Some((next, page)) = fetch(cursor).await {
        keys.extend(page);
        if next == 0 {
            break;
        }
        cursor = next;
    }
    keys.sort_unstable();
    keys.dedup();
    keys
}
