//! Catalog records and the transient events streamed for them.
//!
//! A [`Movie`] is owned by the catalog store and never changes once created.
//! A [`ViewingEvent`] is built by the event pacer, carries its own copy of the
//! movie it was opened for, and is discarded after it has been sent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for `MovieId` parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid movie ID: {0}")]
pub struct ParseMovieIdError(String);

/// Opaque unique key of a movie in the catalog.
///
/// # Validation
///
/// - `FromStr::from_str()`: Validates input (rejects empty strings)
/// - `From::from()` and `new()`: No validation (for internal use with trusted input)
///
/// Use `FromStr` when parsing path segments or other external input.
///
/// # Examples
///
/// ```
/// use fluxflix_core::movie::MovieId;
///
/// let id = MovieId::new("1");
/// assert_eq!(id.as_str(), "1");
///
/// let parsed: MovieId = "2f1c".parse().unwrap();
/// assert_eq!(parsed, MovieId::new("2f1c"));
/// assert!("".parse::<MovieId>().is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(String);

impl MovieId {
    /// Create a new `MovieId` from a string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random key (UUID v4).
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the movie ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert the `MovieId` into its inner `String`.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MovieId {
    type Err = ParseMovieIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseMovieIdError("Movie ID cannot be empty".to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl From<String> for MovieId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MovieId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A movie in the catalog.
///
/// Serialized as `{"id": "...", "title": "...", "genre": "..."}`, which is
/// also the persisted record shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Movie {
    /// Unique key
    pub id: MovieId,
    /// Display title
    pub title: String,
    /// Free-form genre label
    pub genre: String,
}

impl Movie {
    /// Create a new movie record.
    #[must_use]
    pub fn new(id: impl Into<MovieId>, title: impl Into<String>, genre: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            genre: genre.into(),
        }
    }
}

/// One synthetic "now playing" record for a movie.
///
/// Wire shape: `{"movie": {...}, "when": "<RFC 3339>", "user": "..."}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewingEvent {
    /// The movie the stream was opened for
    pub movie: Movie,
    /// Emission time
    pub when: DateTime<Utc>,
    /// Viewer identifier
    pub user: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn movie_id_rejects_empty_input() {
        assert!("".parse::<MovieId>().is_err());
        assert_eq!("abc".parse::<MovieId>().unwrap(), MovieId::new("abc"));
    }

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(MovieId::generate(), MovieId::generate());
    }

    #[test]
    fn movie_serializes_as_flat_record() {
        let movie = Movie::new("1", "Aeon Flux", "action");
        let json = serde_json::to_value(&movie).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "1", "title": "Aeon Flux", "genre": "action"})
        );
    }

    #[test]
    fn viewing_event_wire_shape() {
        let when = DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let event = ViewingEvent {
            movie: Movie::new("1", "Aeon Flux", "action"),
            when,
            user: "rbleek".to_string(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["movie"]["id"], "1");
        assert_eq!(json["user"], "rbleek");
        assert_eq!(json["when"], "2025-01-01T00:00:00Z");
    }
}
