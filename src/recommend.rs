//! Recommendation Selector
//!
//! Picks the next exercises for a student: active exercises at the student's
//! level they have not completed, in authored order, cached per student.

use std::sync::Arc;

use tracing::debug;

use crate::cache::{CacheLayer, CacheScope};
use crate::error::Result;
use crate::exercise::{Exercise, ExerciseCatalog};
use crate::progress::ProgressionTracker;

pub struct RecommendationSelector {
    exercises: Arc<ExerciseCatalog>,
    tracker: Arc<ProgressionTracker>,
    cache: Arc<CacheLayer>,
    max_limit: usize,
    ttl: u64,
}

impl RecommendationSelector {
    pub fn new(
        exercises: Arc<ExerciseCatalog>,
        tracker: Arc<ProgressionTracker>,
        cache: Arc<CacheLayer>,
        max_limit: usize,
        ttl: u64,
    ) -> Self {
        Self {
            exercises,
            tracker,
            cache,
            max_limit: max_limit.max(1),
            ttl,
        }
    }

    /// Up to `limit` exercises, clamped to `1..=max_limit`.
    pub async fn recommend(&self, student_id: u64, limit: usize) -> Result<Vec<Exercise>> {
        let limit = limit.clamp(1, self.max_limit);
        let cache_key = format!("{}:recommendations:{}", student_id, limit);

        if let Some(cached) = self.cache.get(CacheScope::Student, &cache_key).await {
            debug!(student_id, limit, "Recommendations served from cache");
            return Ok(cached);
        }

        let student = self.tracker.student(student_id).await?;
        let completed = self.tracker.completed_exercise_ids(student_id).await?;

        let mut candidates: Vec<&Exercise> = self
            .exercises
            .iter()
            .filter(|e| e.active && e.module_level == student.level)
            .filter(|e| !completed.contains(&e.id))
            .collect();
        candidates.sort_by_key(|e| e.ordre);

        let picked: Vec<Exercise> = candidates.into_iter().take(limit).cloned().collect();

        self.cache
            .set(CacheScope::Student, &cache_key, &picked, Some(self.ttl))
            .await;
        Ok(picked)
    }
}
