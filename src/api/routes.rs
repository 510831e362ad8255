//! API Routes
//!
//! Configures the Axum router with all engine endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    access_handler, attempt_handler, cache_stats_handler, check_handler, exercise_handler,
    health_handler, level_handler, math_handler, phonics_handler, preferences_handler,
    progress_handler, random_math_handler, random_phonics_handler, recommendations_handler,
    upsert_student_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/content/phonics", get(phonics_handler))
        .route("/content/phonics/random", get(random_phonics_handler))
        .route("/content/math", get(math_handler))
        .route("/content/math/random", get(random_math_handler))
        .route("/exercises/:id", get(exercise_handler))
        .route("/exercises/:id/check", post(check_handler))
        .route("/students/:id", put(upsert_student_handler))
        .route(
            "/students/:id/exercises/:exercise_id/attempts",
            post(attempt_handler),
        )
        .route("/students/:id/access", post(access_handler))
        .route("/students/:id/recommendations", get(recommendations_handler))
        .route("/students/:id/progress", get(progress_handler))
        .route("/students/:id/preferences", put(preferences_handler))
        .route("/students/:id/level", put(level_handler))
        .route("/cache/stats", get(cache_stats_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        create_router(AppState::in_memory(&Config::default()))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cache_stats_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/cache/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_exercise_not_found() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/exercises/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_content_without_period_is_rejected() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/content/phonics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
