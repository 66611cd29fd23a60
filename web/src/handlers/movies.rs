//! Catalog read endpoints.
//!
//! - GET /movies - Every movie, as a JSON array streamed element by element
//! - GET /movies/:id - One movie

use super::resolve_movie;
use crate::WebResult;
use crate::state::AppState;
use axum::{
    BoxError, Json,
    body::{Body, Bytes},
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use fluxflix_core::catalog::MovieStream;
use fluxflix_core::movie::Movie;
use futures::{StreamExt, future, stream};

/// List the full catalog.
///
/// The body is written as the store yields movies. A store failure before
/// the first movie is a regular error response; a failure after the body has
/// started aborts the connection.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/movies
/// ```
pub async fn list_movies(State(state): State<AppState>) -> WebResult<Response> {
    let mut movies = state.catalog.find_all();
    let first = movies.next().await.transpose()?;

    Ok((
        [(header::CONTENT_TYPE, "application/json")],
        json_array_body(first, movies),
    )
        .into_response())
}

/// Get one movie by key.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/movies/1
/// ```
pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> WebResult<Json<Movie>> {
    resolve_movie(&state, &id).await.map(Json)
}

fn json_array_body(first: Option<Movie>, rest: MovieStream) -> Body {
    let Some(first) = first else {
        return Body::from("[]");
    };

    let head = stream::once(future::ready(encode_element(b'[', &first)));
    let tail = rest.map(|item| -> Result<Bytes, BoxError> {
        let movie = item.inspect_err(|e| {
            tracing::error!(error = %e, "Catalog stream failed mid-response");
        })?;
        encode_element(b',', &movie)
    });
    let close = stream::once(future::ready(Ok(Bytes::from_static(b"]"))));

    Body::from_stream(head.chain(tail).chain(close))
}

fn encode_element(separator: u8, movie: &Movie) -> Result<Bytes, BoxError> {
    let mut buf = vec![separator];
    serde_json::to_writer(&mut buf, movie)?;
    Ok(Bytes::from(buf))
}
