//! HTTP request handlers.
//!
//! This module contains all HTTP handlers organized by resource.

pub mod events;
pub mod health;
pub mod movies;

// Re-export common handler utilities
pub use events::movie_events;
pub use health::health_check;
pub use movies::{get_movie, list_movies};

use crate::WebResult;
use crate::error::AppError;
use crate::state::AppState;
use fluxflix_core::catalog::CatalogError;
use fluxflix_core::movie::{Movie, MovieId};

/// Parse a path segment and look the movie up, recording the outcome.
async fn resolve_movie(state: &AppState, raw_id: &str) -> WebResult<Movie> {
    let id: MovieId = raw_id
        .parse()
        .map_err(|e| AppError::bad_request(format!("{e}")))?;

    let result = state.catalog.find_by_key(&id).await;
    let outcome = match &result {
        Ok(_) => "found",
        Err(CatalogError::NotFound(_)) => "not_found",
        Err(CatalogError::Unavailable(_)) => "unavailable",
    };
    metrics::counter!("fluxflix_catalog_lookups_total", "outcome" => outcome).increment(1);
    tracing::debug!(movie_id = %id, outcome, "Catalog lookup");

    Ok(result?)
}
