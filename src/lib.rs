//! Eveil - content, progression and caching engine for a children's learning platform
//!
//! Generates phonics and math challenges, tracks per-student progression,
//! recommends the next exercises, and caches hot reads in Redis with an
//! in-process fallback.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod content;
pub mod error;
pub mod exercise;
pub mod models;
pub mod progress;
pub mod recommend;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use error::{AppError, Result};
pub use tasks::spawn_cleanup_task;
