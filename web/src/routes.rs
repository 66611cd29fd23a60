//! Router configuration.

use crate::handlers::{get_movie, health_check, list_movies, movie_events};
use crate::middleware::correlation_id;
use crate::state::AppState;
use axum::{Router, middleware, routing::get};
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// | Method | Path | Handler |
/// |---|---|---|
/// | GET | `/health` | liveness |
/// | GET | `/movies` | full catalog (streamed JSON array) |
/// | GET | `/movies/:id` | one movie, 404 if absent |
/// | GET | `/movies/:id/events` | SSE viewing events, 404 if absent |
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/movies", get(list_movies))
        .route("/movies/:id", get(get_movie))
        .route("/movies/:id/events", get(movie_events))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(correlation_id))
        .with_state(state)
}
