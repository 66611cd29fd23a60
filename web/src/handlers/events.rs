//! Server-Sent Events endpoint for viewing events.
//!
//! ```text
//! Client              Handler               Catalog           EventPacer
//!   │                    │                     │                  │
//!   ├─ GET events ──────>│                     │                  │
//!   │                    ├─ find_by_key ──────>│                  │
//!   │<─ 404 ─────────────┤<── NotFound ────────┤                  │
//!   │                    │<── Movie ───────────┤                  │
//!   │                    ├─ open(movie) ─────────────────────────>│
//!   │<─ data: {...} ─────┤<───────────────── one event per tick ──┤
//!   │<─ data: {...} ─────┤<───────────────────────────────────────┤
//!   ├─ disconnect ──────>│ (body dropped, timer deregistered)     │
//! ```
//!
//! Each frame is `data: {"movie":{...},"when":"...","user":"..."}`.

use super::resolve_movie;
use crate::WebResult;
use crate::extractors::CorrelationId;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::{Stream, StreamExt};

/// Stream viewing events for one movie until the client disconnects.
///
/// The movie is resolved before anything is streamed: an unknown key is a
/// plain 404 and no pacer stream is opened.
///
/// # Example
///
/// ```bash
/// curl -N http://localhost:8080/movies/1/events
/// ```
pub async fn movie_events(
    State(state): State<AppState>,
    Path(id): Path<String>,
    correlation_id: CorrelationId,
) -> WebResult<Sse<impl Stream<Item = Result<Event, axum::Error>>>> {
    let movie = resolve_movie(&state, &id).await?;

    tracing::info!(
        correlation_id = %correlation_id.0,
        movie_id = %movie.id,
        title = %movie.title,
        "Opening viewing event stream"
    );

    let events = state
        .pacer
        .open(movie)
        .map(|event| Event::default().json_data(&event));

    let sse = Sse::new(events);
    Ok(match state.sse_keep_alive {
        Some(interval) => sse.keep_alive(KeepAlive::new().interval(interval)),
        None => sse,
    })
}
