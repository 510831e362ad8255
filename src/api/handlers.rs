//! API Handlers
//!
//! HTTP request handlers for the content, exercise, student and cache endpoints.
//! Handlers stay thin: every rule lives in the engine components.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::cache::{CacheLayer, CacheScope, CacheSettings, CacheStats};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::content::{generate_all_challenges, Catalog, MathChallenge, PhonicsChallenge};
use crate::error::{AppError, Result};
use crate::exercise::{Exercise, ExerciseCatalog};
use crate::models::{
    CacheStatsResponse, CheckRequest, CheckResponse, ContentQuery, HealthResponse, LevelRequest,
    RecommendationQuery, StudentRequest,
};
use crate::progress::{
    AttemptSubmission, InMemoryProgressStore, ProgressStore, ProgressionRecord,
    ProgressionTracker, RetryingStore, Student, StudentPreferences, StudentProgress,
};
use crate::recommend::RecommendationSelector;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub exercises: Arc<ExerciseCatalog>,
    pub cache: Arc<CacheLayer>,
    pub stats: Arc<CacheStats>,
    pub tracker: Arc<ProgressionTracker>,
    pub recommender: Arc<RecommendationSelector>,
}

impl AppState {
    /// Wires the engine around an already connected cache layer.
    pub fn build(
        config: &Config,
        cache: Arc<CacheLayer>,
        stats: Arc<CacheStats>,
        store: Arc<dyn ProgressStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let catalog = Arc::new(generate_all_challenges());
        let exercises = Arc::new(ExerciseCatalog::from_challenges(&catalog));
        let tracker = Arc::new(ProgressionTracker::new(
            store,
            exercises.clone(),
            cache.clone(),
            clock,
            config.progress_ttl,
        ));
        let recommender = Arc::new(RecommendationSelector::new(
            exercises.clone(),
            tracker.clone(),
            cache.clone(),
            config.max_recommendations,
            config.recommendation_ttl,
        ));

        Self {
            catalog,
            exercises,
            cache,
            stats,
            tracker,
            recommender,
        }
    }

    /// Creates a self-contained state with the in-process cache and datastore.
    pub fn in_memory(config: &Config) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let stats = Arc::new(CacheStats::new());
        let cache = Arc::new(CacheLayer::in_memory(
            CacheSettings::from(config),
            stats.clone(),
            clock.clone(),
        ));
        let store: Arc<dyn ProgressStore> = Arc::new(RetryingStore::new(
            Arc::new(InMemoryProgressStore::new()),
            config.datastore_retries,
            std::time::Duration::from_millis(config.datastore_retry_backoff_ms),
        ));
        Self::build(config, cache, stats, store, clock)
    }
}

fn required(value: Option<u8>, name: &'static str, code: &'static str) -> Result<u8> {
    value.ok_or_else(|| AppError::validation(code, format!("Query parameter '{}' is required", name)))
}

fn challenge_not_found(kind: &str, value: u8) -> AppError {
    AppError::NotFound {
        code: "CHALLENGE_NOT_FOUND",
        message: format!("No {} challenge for {}", kind, value),
    }
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.exercises.len()))
}

// == Content ==

/// Handler for GET /content/phonics?period=
pub async fn phonics_handler(
    State(state): State<AppState>,
    Query(query): Query<ContentQuery>,
) -> Result<Json<Vec<PhonicsChallenge>>> {
    let period = required(query.period, "period", "MISSING_PERIOD")?;
    let cache_key = format!("phonics:{}", period);
    if let Some(cached) = state.cache.get(CacheScope::Content, &cache_key).await {
        return Ok(Json(cached));
    }

    let challenges: Vec<PhonicsChallenge> = state
        .catalog
        .phonics_for_period(period)
        .into_iter()
        .cloned()
        .collect();
    state
        .cache
        .set(CacheScope::Content, &cache_key, &challenges, None)
        .await;
    Ok(Json(challenges))
}

/// Handler for GET /content/math?level=
pub async fn math_handler(
    State(state): State<AppState>,
    Query(query): Query<ContentQuery>,
) -> Result<Json<Vec<MathChallenge>>> {
    let level = required(query.level, "level", "MISSING_LEVEL")?;
    let cache_key = format!("math:{}", level);
    if let Some(cached) = state.cache.get(CacheScope::Content, &cache_key).await {
        return Ok(Json(cached));
    }

    let challenges: Vec<MathChallenge> = state
        .catalog
        .math_for_level(level)
        .into_iter()
        .cloned()
        .collect();
    state
        .cache
        .set(CacheScope::Content, &cache_key, &challenges, None)
        .await;
    Ok(Json(challenges))
}

/// Handler for GET /content/phonics/random?period=&seed=
pub async fn random_phonics_handler(
    State(state): State<AppState>,
    Query(query): Query<ContentQuery>,
) -> Result<Json<PhonicsChallenge>> {
    let period = required(query.period, "period", "MISSING_PERIOD")?;
    let mut rng = seeded_rng(query.seed);
    state
        .catalog
        .random_phonics(period, &mut rng)
        .cloned()
        .map(Json)
        .ok_or_else(|| challenge_not_found("phonics", period))
}

/// Handler for GET /content/math/random?level=&seed=
pub async fn random_math_handler(
    State(state): State<AppState>,
    Query(query): Query<ContentQuery>,
) -> Result<Json<MathChallenge>> {
    let level = required(query.level, "level", "MISSING_LEVEL")?;
    let mut rng = seeded_rng(query.seed);
    state
        .catalog
        .random_math(level, &mut rng)
        .cloned()
        .map(Json)
        .ok_or_else(|| challenge_not_found("math", level))
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

// == Exercises ==

/// Handler for GET /exercises/:id
pub async fn exercise_handler(
    State(state): State<AppState>,
    Path(exercise_id): Path<String>,
) -> Result<Json<Exercise>> {
    state
        .exercises
        .get(&exercise_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::exercise_not_found(&exercise_id))
}

/// Handler for POST /exercises/:id/check
pub async fn check_handler(
    State(state): State<AppState>,
    Path(exercise_id): Path<String>,
    body: std::result::Result<Json<CheckRequest>, JsonRejection>,
) -> Result<Json<CheckResponse>> {
    let Json(req) = body?;
    let exercise = state
        .exercises
        .get(&exercise_id)
        .ok_or_else(|| AppError::exercise_not_found(&exercise_id))?;

    let correct = exercise.configuration.evaluate(&req.answer).ok_or_else(|| {
        AppError::validation("INVALID_ANSWER", "Answer does not match the exercise type")
    })?;
    debug!(exercise_id = %exercise_id, correct, "Answer checked");

    Ok(Json(CheckResponse {
        exercise_id,
        correct,
    }))
}

// == Students ==

/// Handler for PUT /students/:id
pub async fn upsert_student_handler(
    State(state): State<AppState>,
    Path(student_id): Path<u64>,
    body: std::result::Result<Json<StudentRequest>, JsonRejection>,
) -> Result<Json<Student>> {
    let Json(req) = body?;
    if let Some(error_msg) = req.validate() {
        return Err(AppError::validation("INVALID_NAME", error_msg));
    }
    let student = state
        .tracker
        .register_student(student_id, req.name.trim(), req.level)
        .await?;
    Ok(Json(student))
}

/// Handler for POST /students/:id/exercises/:exercise_id/attempts
pub async fn attempt_handler(
    State(state): State<AppState>,
    Path((student_id, exercise_id)): Path<(u64, String)>,
    body: std::result::Result<Json<AttemptSubmission>, JsonRejection>,
) -> Result<Json<ProgressionRecord>> {
    let Json(submission) = body?;
    let record = state
        .tracker
        .record_attempt(student_id, &exercise_id, submission)
        .await?;
    Ok(Json(record))
}

/// Handler for POST /students/:id/access
pub async fn access_handler(
    State(state): State<AppState>,
    Path(student_id): Path<u64>,
) -> Result<Json<serde_json::Value>> {
    let streak = state.tracker.update_streak(student_id).await?;
    Ok(Json(serde_json::json!({ "student_id": student_id, "streak": streak })))
}

/// Handler for GET /students/:id/recommendations?limit=
pub async fn recommendations_handler(
    State(state): State<AppState>,
    Path(student_id): Path<u64>,
    Query(query): Query<RecommendationQuery>,
) -> Result<Json<Vec<Exercise>>> {
    let exercises = state.recommender.recommend(student_id, query.limit).await?;
    Ok(Json(exercises))
}

/// Handler for GET /students/:id/progress
pub async fn progress_handler(
    State(state): State<AppState>,
    Path(student_id): Path<u64>,
) -> Result<Json<StudentProgress>> {
    let progress = state.tracker.student_progress(student_id).await?;
    Ok(Json(progress))
}

/// Handler for PUT /students/:id/preferences
pub async fn preferences_handler(
    State(state): State<AppState>,
    Path(student_id): Path<u64>,
    body: std::result::Result<Json<StudentPreferences>, JsonRejection>,
) -> Result<Json<Student>> {
    let Json(preferences) = body?;
    let student = state
        .tracker
        .update_preferences(student_id, preferences)
        .await?;
    Ok(Json(student))
}

/// Handler for PUT /students/:id/level
pub async fn level_handler(
    State(state): State<AppState>,
    Path(student_id): Path<u64>,
    body: std::result::Result<Json<LevelRequest>, JsonRejection>,
) -> Result<Json<Student>> {
    let Json(req) = body?;
    let student = state.tracker.set_level(student_id, req.level).await?;
    Ok(Json(student))
}

// == Cache ==

/// Handler for GET /cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    let fallback_entries = state.cache.fallback().read().await.len();
    Json(CacheStatsResponse {
        backend: state.cache.backend_name(),
        fallback_entries,
        counters: state.stats.snapshot(),
    })
}
