//! API Module
//!
//! HTTP handlers and routing for the learning engine REST API.
//!
//! # Endpoints
//! - `GET /content/phonics`, `GET /content/math` - Generated challenges
//! - `GET /content/{phonics,math}/random` - Seeded random pick
//! - `GET /exercises/:id`, `POST /exercises/:id/check` - Exercise lookup and answer check
//! - `PUT /students/:id` and its `/preferences`, `/level` - Student profile
//! - `POST /students/:id/exercises/:exercise_id/attempts` - Record an attempt
//! - `GET /students/:id/recommendations`, `GET /students/:id/progress`
//! - `GET /cache/stats` - Cache counters
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
