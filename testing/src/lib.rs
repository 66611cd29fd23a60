//! # FluxFlix Testing
//!
//! Testing utilities and helpers for FluxFlix.
//!
//! This crate provides:
//! - In-memory and failing implementations of [`CatalogStore`](fluxflix_core::catalog::CatalogStore)
//! - A fixed clock and a tokio-driven clock for deterministic timestamps
//! - Movie fixtures
//!
//! ## Example
//!
//! ```ignore
//! use fluxflix_testing::{InMemoryCatalogStore, fixtures};
//!
//! #[tokio::test]
//! async fn test_lookup() {
//!     let store = InMemoryCatalogStore::with_movies([fixtures::aeon_flux()]);
//!     let movie = store.find_by_key(&MovieId::new("1")).await.unwrap();
//!     assert_eq!(movie.title, "Aeon Flux");
//! }
//! ```

use chrono::{DateTime, Utc};
use fluxflix_core::environment::Clock;

pub mod catalog_mocks;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use tokio::time::Instant;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use fluxflix_testing::mocks::FixedClock;
    /// use fluxflix_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Wall clock that advances with tokio's time source.
    ///
    /// Reads `base` plus the tokio time elapsed since construction, so under
    /// `#[tokio::test(start_paused = true)]` timestamps move exactly as far as
    /// the paused clock is advanced.
    ///
    /// Must be created inside a tokio runtime.
    #[derive(Debug, Clone)]
    pub struct TokioClock {
        base: DateTime<Utc>,
        start: Instant,
    }

    impl TokioClock {
        /// Create a clock reading `base` now.
        #[must_use]
        pub fn new(base: DateTime<Utc>) -> Self {
            Self {
                base,
                start: Instant::now(),
            }
        }
    }

    impl Clock for TokioClock {
        fn now(&self) -> DateTime<Utc> {
            chrono::Duration::from_std(self.start.elapsed())
                .map_or(self.base, |elapsed| self.base + elapsed)
        }
    }

    /// 2025-01-01 00:00:00 UTC
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_epoch() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .expect("hardcoded timestamp should always parse")
            .with_timezone(&Utc)
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(test_epoch())
    }

    /// Create a tokio-driven clock starting at 2025-01-01 00:00:00 UTC
    #[must_use]
    pub fn tokio_clock() -> TokioClock {
        TokioClock::new(test_epoch())
    }
}

/// Movie fixtures.
pub mod fixtures {
    use fluxflix_core::movie::Movie;

    /// `Movie { id: "1", title: "Aeon Flux", genre: "action" }`
    #[must_use]
    pub fn aeon_flux() -> Movie {
        Movie::new("1", "Aeon Flux", "action")
    }

    /// A small catalog with distinct keys, titles and genres.
    #[must_use]
    pub fn catalog() -> Vec<Movie> {
        vec![
            aeon_flux(),
            Movie::new("2", "The Fluxinator", "horror"),
            Movie::new("3", "Silence of the Lambdas", "drama"),
        ]
    }
}

// Re-export commonly used items
pub use catalog_mocks::{InMemoryCatalogStore, UnavailableCatalogStore};
pub use mocks::{FixedClock, TokioClock, test_clock, tokio_clock};
