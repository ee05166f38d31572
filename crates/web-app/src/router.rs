//! Router configuration for the HTTP API.
//!
//! This module sets up all routes and middleware (CORS, compression, tracing)
//! and creates the axum router ready for serving.

use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers;
use crate::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Exercise management
        .route("/exercises", get(handlers::list_exercises))
        .route("/exercises", post(handlers::create_exercise))
        .route("/exercises/{id}", get(handlers::get_exercise))
        .route("/exercises/{id}", patch(handlers::update_exercise))
        .route("/exercises/{id}", delete(handlers::delete_exercise))
        .route("/exercises/{id}/stats", get(handlers::exercise_stats))
        // Training management
        .route("/trainings", get(handlers::list_trainings))
        .route("/trainings", post(handlers::create_training))
        .route("/trainings/{id}", get(handlers::get_training))
        .route("/trainings/{id}", patch(handlers::update_training))
        .route("/trainings/{id}", delete(handlers::delete_training))
        // Training exercise management
        .route(
            "/trainings/{id}/exercises",
            post(handlers::add_training_exercise),
        )
        .route(
            "/trainings/{id}/exercises/reorder",
            patch(handlers::reorder_training_exercises),
        )
        .route(
            "/training-exercises/{id}",
            patch(handlers::update_training_exercise),
        )
        .route(
            "/training-exercises/{id}",
            delete(handlers::remove_training_exercise),
        )
        // Training session management
        .route("/sessions/start", get(handlers::session_start_options))
        .route("/sessions", post(handlers::create_session))
        .route("/sessions/{id}", get(handlers::get_session))
        .route("/sessions/{id}/complete", patch(handlers::complete_session))
        // Session set management
        .route(
            "/session-exercises/{id}/sets",
            post(handlers::add_session_set),
        )
        .route("/session-sets/{id}", patch(handlers::update_session_set))
        .route(
            "/session-sets/{id}/complete",
            post(handlers::complete_session_set),
        )
        .route("/session-sets/{id}", delete(handlers::delete_session_set));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
