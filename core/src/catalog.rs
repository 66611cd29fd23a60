//! Catalog store trait and related types.
//!
//! The catalog is a single keyed collection of [`Movie`] records. The HTTP
//! shell only reads from it; writes happen during startup seeding.
//!
//! # Implementations
//!
//! - `PostgresCatalogStore` (in `fluxflix-postgres` crate): Production implementation
//! - `InMemoryCatalogStore` (in `fluxflix-testing` crate): Fast, deterministic testing
//!
//! # Example
//!
//! ```no_run
//! use fluxflix_core::catalog::{CatalogError, CatalogStore};
//! use fluxflix_core::movie::{Movie, MovieId};
//! use futures::TryStreamExt;
//!
//! async fn example(store: &dyn CatalogStore) -> Result<(), CatalogError> {
//!     store.insert(Movie::new("1", "Aeon Flux", "action")).await?;
//!
//!     let movie = store.find_by_key(&MovieId::new("1")).await?;
//!     assert_eq!(movie.title, "Aeon Flux");
//!
//!     let all: Vec<Movie> = store.find_all().try_collect().await?;
//!     assert_eq!(all.len(), 1);
//!     Ok(())
//! }
//! ```

use crate::movie::{Movie, MovieId};
use futures::stream::BoxStream;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors that can occur during catalog operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// No movie is stored under the requested key.
    #[error("Movie not found: {0}")]
    NotFound(MovieId),

    /// The backing store could not serve the request (connection, query, decode).
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

/// Stream of catalog records, as returned by [`CatalogStore::find_all`].
///
/// The stream owns everything it needs (`'static`), so it can be handed to
/// an HTTP response body directly.
pub type MovieStream = BoxStream<'static, Result<Movie, CatalogError>>;

/// Boxed future returned by catalog operations.
pub type CatalogFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CatalogError>> + Send + 'a>>;

/// Keyed collection of movies.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the store is shared across all
/// request handlers as `Arc<dyn CatalogStore>`.
///
/// # Dyn Compatibility
///
/// This trait uses explicit `Pin<Box<dyn Future>>` returns instead of `async fn`
/// so it can be used as a trait object.
pub trait CatalogStore: Send + Sync {
    /// Find a single movie by key.
    ///
    /// # Errors
    ///
    /// - `NotFound`: No movie with this key
    /// - `Unavailable`: The backing store failed
    fn find_by_key<'a>(&'a self, id: &'a MovieId) -> CatalogFuture<'a, Movie>;

    /// Stream every movie in the catalog.
    ///
    /// Ordering is implementation-defined but stable for a given store.
    /// Backend failures surface as `Err` items.
    fn find_all(&self) -> MovieStream;

    /// Remove every movie, returning the number of removed records.
    ///
    /// # Errors
    ///
    /// - `Unavailable`: The backing store failed
    fn delete_all(&self) -> CatalogFuture<'_, u64>;

    /// Insert a movie, replacing any existing record with the same key.
    ///
    /// # Errors
    ///
    /// - `Unavailable`: The backing store failed
    fn insert(&self, movie: Movie) -> CatalogFuture<'_, ()>;
}
