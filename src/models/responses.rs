//! Response DTOs for the HTTP surface
//!
//! Defines the structure of outgoing HTTP response bodies that are not
//! domain types serialized as-is.

use serde::Serialize;

use crate::cache::CacheStatsSnapshot;

/// Response body for `POST /exercises/:id/check`
#[derive(Debug, Clone, Serialize)]
pub struct CheckResponse {
    pub exercise_id: String,
    pub correct: bool,
}

/// Response body for `GET /cache/stats`
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    /// `redis` or `memory`
    pub backend: &'static str,
    /// Entries currently held by the in-process map
    pub fallback_entries: usize,
    #[serde(flatten)]
    pub counters: CacheStatsSnapshot,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Number of exercises loaded
    pub exercises: usize,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(exercises: usize) -> Self {
        Self {
            status: "healthy".to_string(),
            exercises,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy(12);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
        assert!(json.contains("\"exercises\":12"));
    }

    #[test]
    fn test_cache_stats_response_flattens_counters() {
        let resp = CacheStatsResponse {
            backend: "memory",
            fallback_entries: 3,
            counters: CacheStatsSnapshot {
                hits: 4,
                misses: 1,
                slow_operations: 0,
                hit_rate: 0.8,
            },
        };
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["backend"], "memory");
        assert_eq!(value["hits"], 4);
        assert_eq!(value["hit_rate"], 0.8);
    }
}
