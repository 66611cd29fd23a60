//! In-memory catalog testing utilities
//!
//! Provides fast, deterministic stand-ins for the durable catalog:
//! - [`InMemoryCatalogStore`]: `BTreeMap`-based catalog storage
//! - [`UnavailableCatalogStore`]: A catalog whose backend is always down

use fluxflix_core::catalog::{CatalogError, CatalogFuture, CatalogStore, MovieStream};
use fluxflix_core::movie::{Movie, MovieId};
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory catalog store for fast, deterministic testing.
///
/// `find_all` yields movies in key order from a snapshot taken when the
/// stream is created.
///
/// # Example
///
/// ```
/// use fluxflix_testing::InMemoryCatalogStore;
/// use fluxflix_core::catalog::CatalogStore;
/// use fluxflix_core::movie::{Movie, MovieId};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryCatalogStore::new();
///
/// store.insert(Movie::new("1", "Aeon Flux", "action")).await?;
///
/// let movie = store.find_by_key(&MovieId::new("1")).await?;
/// assert_eq!(movie.title, "Aeon Flux");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryCatalogStore {
    movies: Arc<RwLock<BTreeMap<MovieId, Movie>>>,
}

impl InMemoryCatalogStore {
    /// Create a new empty in-memory catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<MovieId, Movie>> {
        self.movies.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<MovieId, Movie>> {
        self.movies.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a catalog pre-populated with `movies`.
    #[must_use]
    pub fn with_movies(movies: impl IntoIterator<Item = Movie>) -> Self {
        let store = Self::new();
        {
            let mut guard = store.write();
            for movie in movies {
                guard.insert(movie.id.clone(), movie);
            }
        }
        store
    }

    /// Get the number of stored movies
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check if the catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Snapshot of every stored movie, in key order
    #[must_use]
    pub fn snapshot(&self) -> Vec<Movie> {
        self.read().values().cloned().collect()
    }
}

impl CatalogStore for InMemoryCatalogStore {
    fn find_by_key<'a>(&'a self, id: &'a MovieId) -> CatalogFuture<'a, Movie> {
        Box::pin(async move {
            self.read()
                .get(id)
                .cloned()
                .ok_or_else(|| CatalogError::NotFound(id.clone()))
        })
    }

    fn find_all(&self) -> MovieStream {
        stream::iter(self.snapshot().into_iter().map(Ok)).boxed()
    }

    fn delete_all(&self) -> CatalogFuture<'_, u64> {
        Box::pin(async move {
            let mut guard = self.write();
            let removed = guard.len() as u64;
            guard.clear();
            Ok(removed)
        })
    }

    fn insert(&self, movie: Movie) -> CatalogFuture<'_, ()> {
        Box::pin(async move {
            self.write().insert(movie.id.clone(), movie);
            Ok(())
        })
    }
}

/// Catalog whose backend is permanently unreachable.
///
/// Every operation fails with [`CatalogError::Unavailable`]. Useful for
/// checking how callers surface store outages.
#[derive(Clone, Debug)]
pub struct UnavailableCatalogStore {
    reason: String,
}

impl UnavailableCatalogStore {
    /// Create a failing store with the given reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> CatalogError {
        CatalogError::Unavailable(self.reason.clone())
    }
}

impl Default for UnavailableCatalogStore {
    fn default() -> Self {
        Self::new("connection refused")
    }
}

impl CatalogStore for UnavailableCatalogStore {
    fn find_by_key<'a>(&'a self, _id: &'a MovieId) -> CatalogFuture<'a, Movie> {
        let err = self.error();
        Box::pin(async move { Err(err) })
    }

    fn find_all(&self) -> MovieStream {
        stream::iter([Err(self.error())]).boxed()
    }

    fn delete_all(&self) -> CatalogFuture<'_, u64> {
        let err = self.error();
        Box::pin(async move { Err(err) })
    }

    fn insert(&self, _movie: Movie) -> CatalogFuture<'_, ()> {
        let err = self.error();
        Box::pin(async move { Err(err) })
    }
}
