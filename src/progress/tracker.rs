//! Progression Tracker
//!
//! Records attempts, keeps streaks and points, and drops a student's cached
//! recommendations and progress whenever their state changes.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cache::{CacheLayer, CacheScope};
use crate::clock::Clock;
use crate::error::{AppError, Result};
use crate::exercise::ExerciseCatalog;
use crate::progress::student::validate_level;
use crate::progress::{
    AttemptSubmission, ProgressStatus, ProgressStore, ProgressionRecord, Student,
    StudentPreferences, StudentUpdate,
};

/// Aggregate progress for one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentProgress {
    pub student_id: u64,
    pub level: u8,
    pub streak: u32,
    pub total_points: u64,
    pub exercises_started: usize,
    pub exercises_completed: usize,
    pub exercises_mastered: usize,
    pub attempts: u32,
    pub successes: u32,
    pub success_rate: f64,
}

pub struct ProgressionTracker {
    store: Arc<dyn ProgressStore>,
    exercises: Arc<ExerciseCatalog>,
    cache: Arc<CacheLayer>,
    clock: Arc<dyn Clock>,
    progress_ttl: u64,
}

impl ProgressionTracker {
    pub fn new(
        store: Arc<dyn ProgressStore>,
        exercises: Arc<ExerciseCatalog>,
        cache: Arc<CacheLayer>,
        clock: Arc<dyn Clock>,
        progress_ttl: u64,
    ) -> Self {
        Self {
            store,
            exercises,
            cache,
            clock,
            progress_ttl,
        }
    }

    /// Loads a student or fails with `STUDENT_NOT_FOUND`.
    pub async fn student(&self, student_id: u64) -> Result<Student> {
        self.store
            .find_student(student_id)
            .await?
            .ok_or_else(|| AppError::student_not_found(student_id))
    }

    /// Creates a student, or renames and re-levels an existing one while
    /// keeping its streak, points and preferences.
    pub async fn register_student(&self, student_id: u64, name: &str, level: u8) -> Result<Student> {
        let level = validate_level(level)?;
        let rename = |student: &mut Student| {
            student.name = name.to_string();
            student.level = level;
        };
        let student = match self.store.update_student(student_id, &rename).await? {
            Some(existing) => existing,
            None => {
                let created = Student::new(student_id, name, level)?;
                self.store.save_student(created.clone()).await?;
                created
            }
        };
        self.invalidate_student(student_id).await;
        Ok(student)
    }

    /// Applies `update` atomically, failing with `STUDENT_NOT_FOUND`.
    async fn update_student(&self, student_id: u64, update: StudentUpdate<'_>) -> Result<Student> {
        self.store
            .update_student(student_id, update)
            .await?
            .ok_or_else(|| AppError::student_not_found(student_id))
    }

    // == Record Attempt ==
    /// Validates and applies one attempt, then updates the streak and points.
    ///
    /// Nothing is written when validation or a lookup fails.
    pub async fn record_attempt(
        &self,
        student_id: u64,
        exercise_id: &str,
        submission: AttemptSubmission,
    ) -> Result<ProgressionRecord> {
        let attempt = submission.validate()?;
        self.student(student_id).await?;
        let reward = self
            .exercises
            .get(exercise_id)
            .ok_or_else(|| AppError::exercise_not_found(exercise_id))?
            .points_reward;

        let at = self.clock.now();
        let was_done = AtomicBool::new(false);
        let record = self
            .store
            .upsert_record(student_id, exercise_id, &|record: &mut ProgressionRecord| {
                was_done.store(record.status.is_done(), Ordering::SeqCst);
                record.apply_attempt(&attempt, reward, at)
            })
            .await?;

        let today = at.date_naive();
        let earned = if attempt.success { u64::from(reward) } else { 0 };
        self.update_student(student_id, &|student: &mut Student| {
            student.touch_streak(today);
            student.total_points += earned;
        })
        .await?;

        debug!(
            student_id,
            exercise_id,
            success = attempt.success,
            status = ?record.status,
            "Attempt recorded"
        );

        let completion_changed = was_done.load(Ordering::SeqCst) != record.status.is_done();
        if attempt.success || completion_changed {
            self.invalidate_student(student_id).await;
        } else {
            self.forget_progress(student_id).await;
        }
        Ok(record)
    }

    // == Update Streak ==
    /// Registers an access today and returns the resulting streak.
    pub async fn update_streak(&self, student_id: u64) -> Result<u32> {
        let today = self.clock.today();
        let student = self
            .update_student(student_id, &|student: &mut Student| student.touch_streak(today))
            .await?;
        self.forget_progress(student_id).await;
        Ok(student.streak)
    }

    // == Adaptation updates ==
    pub async fn update_preferences(
        &self,
        student_id: u64,
        preferences: StudentPreferences,
    ) -> Result<Student> {
        let student = self
            .update_student(student_id, &|student: &mut Student| {
                student.preferences = preferences.clone()
            })
            .await?;
        self.invalidate_student(student_id).await;
        Ok(student)
    }

    pub async fn set_level(&self, student_id: u64, level: u8) -> Result<Student> {
        let level = validate_level(level)?;
        let previous = AtomicU8::new(level);
        let student = self
            .update_student(student_id, &|student: &mut Student| {
                previous.store(student.level, Ordering::SeqCst);
                student.level = level;
            })
            .await?;
        let from = previous.load(Ordering::SeqCst);
        if from != level {
            info!(student_id, from, to = level, "Student level changed");
        }
        self.invalidate_student(student_id).await;
        Ok(student)
    }

    // == Progress summary ==
    /// Cache-aside summary of a student's progress.
    pub async fn student_progress(&self, student_id: u64) -> Result<StudentProgress> {
        let cache_key = format!("{}:progress", student_id);
        if let Some(cached) = self.cache.get(CacheScope::Student, &cache_key).await {
            return Ok(cached);
        }

        let student = self.student(student_id).await?;
        let records = self.store.records_for_student(student_id).await?;
        let progress = summarize(&student, &records);

        self.cache
            .set(CacheScope::Student, &cache_key, &progress, Some(self.progress_ttl))
            .await;
        Ok(progress)
    }

    /// Completed or mastered exercise ids for a student.
    pub async fn completed_exercise_ids(&self, student_id: u64) -> Result<HashSet<String>> {
        self.store.completed_exercise_ids(student_id).await
    }

    async fn forget_progress(&self, student_id: u64) {
        self.cache
            .delete(CacheScope::Student, &format!("{}:progress", student_id))
            .await;
    }

    async fn invalidate_student(&self, student_id: u64) {
        let removed = self
            .cache
            .invalidate_pattern(CacheScope::Student, &format!("{}:*", student_id))
            .await;
        debug!(student_id, removed, "Student cache invalidated");
    }
}

fn summarize(student: &Student, records: &[ProgressionRecord]) -> StudentProgress {
    let attempts: u32 = records.iter().map(|r| r.attempts).sum();
    let successes: u32 = records.iter().map(|r| r.successes).sum();
    StudentProgress {
        student_id: student.id,
        level: student.level,
        streak: student.streak,
        total_points: student.total_points,
        exercises_started: records.len(),
        exercises_completed: records.iter().filter(|r| r.status.is_done()).count(),
        exercises_mastered: records
            .iter()
            .filter(|r| r.status == ProgressStatus::Mastered)
            .count(),
        attempts,
        successes,
        success_rate: if attempts == 0 {
            0.0
        } else {
            f64::from(successes) / f64::from(attempts)
        },
    }
}
