//! Progression Record
//!
//! Per (student, exercise) attempt aggregate and the status state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};

/// Longest accepted attempt, in seconds.
pub const MAX_TIME_SPENT_SECS: u32 = 3600;
/// Prior attempts after which a failure demotes a completed exercise.
pub const DEMOTION_ATTEMPT_THRESHOLD: u32 = 3;
/// Successes needed before an exercise can be mastered.
pub const MASTERY_SUCCESS_THRESHOLD: u32 = 3;
/// Success rate needed before an exercise can be mastered.
pub const MASTERY_SUCCESS_RATE: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    NotStarted,
    InProgress,
    Completed,
    Mastered,
}

impl ProgressStatus {
    pub fn is_done(self) -> bool {
        matches!(self, ProgressStatus::Completed | ProgressStatus::Mastered)
    }
}

// == Attempt input ==
/// Attempt as submitted, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttemptSubmission {
    pub success: Option<bool>,
    pub time_spent_secs: Option<i64>,
    #[serde(default)]
    pub hints_used: Option<i64>,
    #[serde(default)]
    pub answer: Value,
}

/// A validated attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    pub success: bool,
    pub time_spent_secs: u32,
    pub hints_used: u32,
    pub answer: Value,
}

impl AttemptSubmission {
    /// Checks shape and ranges; nothing is mutated before this passes.
    pub fn validate(self) -> Result<Attempt> {
        let success = self.success.ok_or_else(|| {
            AppError::validation("MISSING_SUCCESS_FLAG", "Attempt must state whether it succeeded")
        })?;

        let time_spent_secs = self
            .time_spent_secs
            .filter(|secs| (1..=i64::from(MAX_TIME_SPENT_SECS)).contains(secs))
            .ok_or_else(|| {
                AppError::validation(
                    "INVALID_TIME_SPENT",
                    format!("Time spent must be between 1 and {} seconds", MAX_TIME_SPENT_SECS),
                )
            })? as u32;

        let hints_used = match self.hints_used {
            None => 0,
            Some(hints) => u32::try_from(hints).map_err(|_| {
                AppError::validation("INVALID_HINTS_USED", "Hints used cannot be negative")
            })?,
        };

        Ok(Attempt {
            success,
            time_spent_secs,
            hints_used,
            answer: self.answer,
        })
    }
}

// == History ==
/// One entry in the append-only attempt log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptEntry {
    pub at: DateTime<Utc>,
    pub success: bool,
    pub time_spent_secs: u32,
    pub hints_used: u32,
    pub points: u32,
    pub answer: Value,
}

// == Progression Record ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionRecord {
    pub student_id: u64,
    pub exercise_id: String,
    pub status: ProgressStatus,
    pub attempts: u32,
    pub successes: u32,
    pub points: u32,
    pub first_success_at: Option<DateTime<Utc>>,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub history: Vec<AttemptEntry>,
}

impl ProgressionRecord {
    pub fn new(student_id: u64, exercise_id: impl Into<String>) -> Self {
        Self {
            student_id,
            exercise_id: exercise_id.into(),
            status: ProgressStatus::NotStarted,
            attempts: 0,
            successes: 0,
            points: 0,
            first_success_at: None,
            last_attempt_at: None,
            history: Vec::new(),
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            f64::from(self.successes) / f64::from(self.attempts)
        }
    }

    /// Applies one validated attempt worth `reward` points on success.
    ///
    /// A failure demotes a completed or mastered exercise back to in progress
    /// once it had at least three prior attempts. That rule is kept as the
    /// product currently behaves; whether mastery should survive it is an
    /// open product question.
    pub fn apply_attempt(&mut self, attempt: &Attempt, reward: u32, at: DateTime<Utc>) {
        let prior_attempts = self.attempts;
        self.attempts += 1;
        self.last_attempt_at = Some(at);

        let points = if attempt.success { reward } else { 0 };
        if attempt.success {
            self.successes += 1;
            self.points += reward;
            self.first_success_at.get_or_insert(at);
            self.status = if self.status == ProgressStatus::Mastered || self.reaches_mastery() {
                ProgressStatus::Mastered
            } else {
                ProgressStatus::Completed
            };
        } else {
            self.status = match self.status {
                ProgressStatus::NotStarted | ProgressStatus::InProgress => ProgressStatus::InProgress,
                _ if prior_attempts >= DEMOTION_ATTEMPT_THRESHOLD => ProgressStatus::InProgress,
                done => done,
            };
        }

        self.history.push(AttemptEntry {
            at,
            success: attempt.success,
            time_spent_secs: attempt.time_spent_secs,
            hints_used: attempt.hints_used,
            points,
            answer: attempt.answer.clone(),
        });
    }

    fn reaches_mastery(&self) -> bool {
        self.successes >= MASTERY_SUCCESS_THRESHOLD && self.success_rate() >= MASTERY_SUCCESS_RATE
    }
}
