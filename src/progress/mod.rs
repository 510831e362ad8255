//! Progress Module
//!
//! Per-student attempt tracking: validation, the status state machine,
//! streaks, and the datastore collaborator it persists through.

mod record;
mod store;
mod student;
mod tracker;

pub use record::{
    Attempt, AttemptEntry, AttemptSubmission, ProgressStatus, ProgressionRecord,
    DEMOTION_ATTEMPT_THRESHOLD, MAX_TIME_SPENT_SECS,
};
pub use store::{InMemoryProgressStore, ProgressStore, RecordUpdate, RetryingStore, StudentUpdate};
pub use student::{validate_level, Student, StudentPreferences, MAX_LEVEL, MIN_LEVEL};
pub use tracker::{ProgressionTracker, StudentProgress};
