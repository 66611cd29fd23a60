//! `PostgreSQL` catalog store for FluxFlix.
//!
//! This crate provides the durable implementation of the `CatalogStore` trait
//! from `fluxflix-core`, backed by a single `movies` table:
//!
//! ```sql
//! CREATE TABLE movies (
//!     id TEXT PRIMARY KEY,
//!     title TEXT NOT NULL,
//!     genre TEXT NOT NULL
//! );
//! ```
//!
//! # Example
//!
//! ```ignore
//! use fluxflix_postgres::PostgresCatalogStore;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = PostgresCatalogStore::connect("postgres://localhost/fluxflix", 10).await?;
//!     store.migrate().await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use fluxflix_core::catalog::{CatalogError, CatalogFuture, CatalogStore, MovieStream};
use fluxflix_core::movie::{Movie, MovieId};
use futures::StreamExt;
use sqlx::postgres::{PgPool, PgPoolOptions};

const FIND_BY_KEY: &str = "SELECT id, title, genre FROM movies WHERE id = $1";
const FIND_ALL: &str = "SELECT id, title, genre FROM movies ORDER BY title, id";
const DELETE_ALL: &str = "DELETE FROM movies";
const UPSERT: &str = "INSERT INTO movies (id, title, genre)
     VALUES ($1, $2, $3)
     ON CONFLICT (id) DO UPDATE
     SET title = EXCLUDED.title, genre = EXCLUDED.genre";

/// Row shape of the `movies` table.
#[derive(Debug, sqlx::FromRow)]
struct MovieRow {
    id: String,
    title: String,
    genre: String,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Self::new(row.id, row.title, row.genre)
    }
}

fn unavailable(operation: &str, err: &sqlx::Error) -> CatalogError {
    tracing::error!(operation, error = %err, "Catalog query failed");
    CatalogError::Unavailable(format!("{operation} failed: {err}"))
}

/// PostgreSQL-backed movie catalog.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone, Debug)]
pub struct PostgresCatalogStore {
    pool: PgPool,
}

impl PostgresCatalogStore {
    /// Create a catalog store using an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `database_url` with a pool of at most `max_connections`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Unavailable`] if the connection fails.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, CatalogError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| unavailable("connect", &e))?;

        tracing::info!(max_connections, "Connected to catalog database");
        Ok(Self::new(pool))
    }

    /// Create the `movies` table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Unavailable`] if migration fails.
    pub async fn migrate(&self) -> Result<(), CatalogError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| CatalogError::Unavailable(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl CatalogStore for PostgresCatalogStore {
    fn find_by_key<'a>(&'a self, id: &'a MovieId) -> CatalogFuture<'a, Movie> {
        Box::pin(async move {
            let row: Option<MovieRow> = sqlx::query_as(FIND_BY_KEY)
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| unavailable("find_by_key", &e))?;

            row.map(Movie::from)
                .ok_or_else(|| CatalogError::NotFound(id.clone()))
        })
    }

    fn find_all(&self) -> MovieStream {
        let pool = self.pool.clone();

        async_stream::stream! {
            let mut rows = sqlx::query_as::<_, MovieRow>(FIND_ALL).fetch(&pool);
            while let Some(row) = rows.next().await {
                match row {
                    Ok(row) => {
                        yield Ok(Movie::from(row));
                    },
                    Err(e) => {
                        yield Err(unavailable("find_all", &e));
                        break;
                    },
                }
            }
        }
        .boxed()
    }

    fn delete_all(&self) -> CatalogFuture<'_, u64> {
        Box::pin(async move {
            let result = sqlx::query(DELETE_ALL)
                .execute(&self.pool)
                .await
                .map_err(|e| unavailable("delete_all", &e))?;

            Ok(result.rows_affected())
        })
    }

    fn insert(&self, movie: Movie) -> CatalogFuture<'_, ()> {
        Box::pin(async move {
            sqlx::query(UPSERT)
                .bind(movie.id.as_str())
                .bind(&movie.title)
                .bind(&movie.genre)
                .execute(&self.pool)
                .await
                .map_err(|e| unavailable("insert", &e))?;

            Ok(())
        })
    }
}
