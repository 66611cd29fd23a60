//! Axum HTTP shell for FluxFlix.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         HTTP Shell (Axum)               │  ← routing, JSON, SSE framing
//! │  - Path parsing                         │  ← correlation IDs, tracing
//! │  - Error → status mapping               │  ← metrics
//! ├─────────────────────────────────────────┤
//! │         Core                            │
//! │  - CatalogStore (Arc<dyn>)              │  ← keyed movie lookups
//! │  - EventPacer                           │  ← clock-paced event streams
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Request Flow
//!
//! 1. **HTTP Request** arrives, gets a correlation ID and a tracing span
//! 2. **Resolve** the movie through the `CatalogStore`
//! 3. **Respond** with JSON, or hand the movie to the `EventPacer` and
//!    forward its events as Server-Sent Events
//!
//! # Example
//!
//! ```ignore
//! use fluxflix_web::{AppState, build_router};
//!
//! let state = AppState::new(catalog, pacer);
//! let app = build_router(state);
//! axum::serve(listener, app).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::CorrelationId;
pub use middleware::{CORRELATION_ID_HEADER, correlation_id};
pub use routes::build_router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
