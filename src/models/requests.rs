//! Request DTOs for the HTTP surface
//!
//! Defines the structure of incoming HTTP request bodies and query strings.
//! Attempt bodies deserialize straight into `AttemptSubmission`.

use serde::Deserialize;
use serde_json::Value;

/// Body of `PUT /students/:id`
#[derive(Debug, Clone, Deserialize)]
pub struct StudentRequest {
    pub name: String,
    pub level: u8,
}

impl StudentRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Some("Name cannot be empty".to_string());
        }
        if name.chars().count() > 100 {
            return Some("Name exceeds maximum length of 100 characters".to_string());
        }
        None
    }
}

/// Body of `PUT /students/:id/level`
#[derive(Debug, Clone, Deserialize)]
pub struct LevelRequest {
    pub level: u8,
}

/// Body of `POST /exercises/:id/check`
#[derive(Debug, Clone, Deserialize)]
pub struct CheckRequest {
    pub answer: Value,
}

/// Query of `GET /students/:id/recommendations`
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    5
}

/// Query of the content listing endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentQuery {
    pub period: Option<u8>,
    pub level: Option<u8>,
    /// Seed for random picks; the caller owns the randomness
    pub seed: Option<u64>,
}
