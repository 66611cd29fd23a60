//! Application state for Axum handlers.

use fluxflix_core::catalog::CatalogStore;
use fluxflix_core::pacer::EventPacer;
use std::sync::Arc;
use std::time::Duration;

/// Application state shared across all HTTP handlers.
///
/// Cloned per request; every field is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    /// Movie catalog
    pub catalog: Arc<dyn CatalogStore>,
    /// Factory for viewing event streams
    pub pacer: EventPacer,
    /// Interval of SSE keep-alive comments (`None` disables them)
    pub sse_keep_alive: Option<Duration>,
}

impl AppState {
    /// Create a new application state without SSE keep-alives.
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogStore>, pacer: EventPacer) -> Self {
        Self {
            catalog,
            pacer,
            sse_keep_alive: None,
        }
    }

    /// Send a keep-alive comment on idle event streams every `interval`.
    #[must_use]
    pub const fn with_sse_keep_alive(mut self, interval: Option<Duration>) -> Self {
        self.sse_keep_alive = interval;
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("pacer", &self.pacer)
            .field("sse_keep_alive", &self.sse_keep_alive)
            .finish_non_exhaustive()
    }
}
