//! Progress Store
//!
//! The datastore collaborator behind the progression tracker, an in-memory
//! implementation, and a decorator retrying transient faults.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::warn;

use crate::error::Result;
use crate::progress::{ProgressionRecord, Student};

/// Mutation applied to a record inside an atomic upsert.
pub type RecordUpdate<'a> = &'a (dyn Fn(&mut ProgressionRecord) + Send + Sync);

/// Mutation applied to a student inside an atomic update.
pub type StudentUpdate<'a> = &'a (dyn Fn(&mut Student) + Send + Sync);

#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn find_student(&self, student_id: u64) -> Result<Option<Student>>;

    async fn save_student(&self, student: Student) -> Result<()>;

    /// Applies `update` to an existing student and stores the result as one
    /// atomic step. `None` when the student does not exist.
    async fn update_student(&self, student_id: u64, update: StudentUpdate<'_>) -> Result<Option<Student>>;

    async fn find_record(&self, student_id: u64, exercise_id: &str) -> Result<Option<ProgressionRecord>>;

    /// Creates the record if absent, applies `update`, and stores the result
    /// as one atomic step.
    async fn upsert_record(
        &self,
        student_id: u64,
        exercise_id: &str,
        update: RecordUpdate<'_>,
    ) -> Result<ProgressionRecord>;

    /// Ids of exercises the student has completed or mastered.
    async fn completed_exercise_ids(&self, student_id: u64) -> Result<HashSet<String>>;

    async fn records_for_student(&self, student_id: u64) -> Result<Vec<ProgressionRecord>>;
}

// == In-Memory Store ==
#[derive(Debug, Default)]
pub struct InMemoryProgressStore {
    students: RwLock<HashMap<u64, Student>>,
    records: RwLock<HashMap<(u64, String), ProgressionRecord>>,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressStore for InMemoryProgressStore {
    async fn find_student(&self, student_id: u64) -> Result<Option<Student>> {
        Ok(self.students.read().await.get(&student_id).cloned())
    }

    async fn save_student(&self, student: Student) -> Result<()> {
        self.students.write().await.insert(student.id, student);
        Ok(())
    }

    async fn update_student(&self, student_id: u64, update: StudentUpdate<'_>) -> Result<Option<Student>> {
        let mut students = self.students.write().await;
        Ok(students.get_mut(&student_id).map(|student| {
            update(student);
            student.clone()
        }))
    }

    async fn find_record(&self, student_id: u64, exercise_id: &str) -> Result<Option<ProgressionRecord>> {
        Ok(self
            .records
            .read()
            .await
            .get(&(student_id, exercise_id.to_string()))
            .cloned())
    }

    async fn upsert_record(
        &self,
        student_id: u64,
        exercise_id: &str,
        update: RecordUpdate<'_>,
    ) -> Result<ProgressionRecord> {
        let mut records = self.records.write().await;
        let record = records
            .entry((student_id, exercise_id.to_string()))
            .or_insert_with(|| ProgressionRecord::new(student_id, exercise_id));
        update(record);
        Ok(record.clone())
    }

    async fn completed_exercise_ids(&self, student_id: u64) -> Result<HashSet<String>> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.student_id == student_id && r.status.is_done())
            .map(|r| r.exercise_id.clone())
            .collect())
    }

    async fn records_for_student(&self, student_id: u64) -> Result<Vec<ProgressionRecord>> {
        let mut records: Vec<ProgressionRecord> = self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.student_id == student_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.exercise_id.cmp(&b.exercise_id));
        Ok(records)
    }
}

// == Retrying Store ==
/// Retries transient datastore errors with linear backoff.
pub struct RetryingStore {
    inner: Arc<dyn ProgressStore>,
    retries: u32,
    backoff: Duration,
}

impl RetryingStore {
    pub fn new(inner: Arc<dyn ProgressStore>, retries: u32, backoff: Duration) -> Self {
        Self {
            inner,
            retries,
            backoff,
        }
    }

    async fn pause(&self, operation: &str, attempt: u32, error: &crate::error::AppError) {
        warn!(
            operation,
            attempt,
            error = %error,
            "Transient datastore error, retrying"
        );
        tokio::time::sleep(self.backoff * attempt).await;
    }
}

/// Repeats `$call` while it fails transiently and retries remain.
macro_rules! with_retry {
    ($self:ident, $operation:expr, $call:expr) => {{
        let mut attempt = 0;
        loop {
            match $call {
                Err(e) if e.is_transient() && attempt < $self.retries => {
                    attempt += 1;
                    $self.pause($operation, attempt, &e).await;
                }
                result => break result,
            }
        }
    }};
}

#[async_trait]
impl ProgressStore for RetryingStore {
    async fn find_student(&self, student_id: u64) -> Result<Option<Student>> {
        with_retry!(self, "find_student", self.inner.find_student(student_id).await)
    }

    async fn save_student(&self, student: Student) -> Result<()> {
        with_retry!(self, "save_student", self.inner.save_student(student.clone()).await)
    }

    async fn update_student(&self, student_id: u64, update: StudentUpdate<'_>) -> Result<Option<Student>> {
        with_retry!(
            self,
            "update_student",
            self.inner.update_student(student_id, update).await
        )
    }

    async fn find_record(&self, student_id: u64, exercise_id: &str) -> Result<Option<ProgressionRecord>> {
        with_retry!(
            self,
            "find_record",
            self.inner.find_record(student_id, exercise_id).await
        )
    }

    async fn upsert_record(
        &self,
        student_id: u64,
        exercise_id: &str,
        update: RecordUpdate<'_>,
    ) -> Result<ProgressionRecord> {
        with_retry!(
            self,
            "upsert_record",
            self.inner.upsert_record(student_id, exercise_id, update).await
        )
    }

    async fn completed_exercise_ids(&self, student_id: u64) -> Result<HashSet<String>> {
        with_retry!(
            self,
            "completed_exercise_ids",
            self.inner.completed_exercise_ids(student_id).await
        )
    }

    async fn records_for_student(&self, student_id: u64) -> Result<Vec<ProgressionRecord>> {
        with_retry!(
            self,
            "records_for_student",
            self.inner.records_for_student(student_id).await
        )
    }
}
