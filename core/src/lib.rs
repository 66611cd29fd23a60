//! # FluxFlix Core
//!
//! Domain types, the catalog store abstraction, and the event pacer.
//!
//! ## Core Concepts
//!
//! - **Movie**: A catalog record keyed by [`movie::MovieId`]
//! - **Catalog Store**: Keyed collection of movies ([`catalog::CatalogStore`])
//! - **Viewing Event**: A synthetic "now playing" record for one movie
//! - **Event Pacer**: Turns a movie into an unbounded, clock-paced stream of
//!   viewing events ([`pacer::EventPacer`])
//! - **Environment**: Injected dependencies via traits ([`environment::Clock`])
//!
//! ## Architecture Principles
//!
//! - The pacer does no I/O: it reads the clock and draws random numbers
//! - Pacing is delegated to a timer; event construction is never throttled
//! - Stores are shared as `Arc<dyn CatalogStore>`
//!
//! ## Example
//!
//! ```ignore
//! use fluxflix_core::prelude::*;
//!
//! async fn watch(store: &dyn CatalogStore, pacer: &EventPacer) -> Result<(), CatalogError> {
//!     let movie = store.find_by_key(&MovieId::new("1")).await?;
//!     let mut events = pacer.open(movie);
//!     while let Some(event) = events.next().await {
//!         // forward to the client
//!     }
//!     Ok(())
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};

pub mod catalog;
pub mod movie;
pub mod pacer;

/// Environment module - Dependency injection traits
///
/// All time reads go through [`environment::Clock`] so tests can pin or
/// drive the wall clock.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Test - fixed time for deterministic tests
    /// struct FixedClock { time: DateTime<Utc> }
    /// impl Clock for FixedClock {
    ///     fn now(&self) -> DateTime<Utc> {
    ///         self.time
    ///     }
    /// }
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

/// Commonly used items.
pub mod prelude {
    pub use crate::catalog::{CatalogError, CatalogStore, MovieStream};
    pub use crate::environment::{Clock, SystemClock};
    pub use crate::movie::{Movie, MovieId, ViewingEvent};
    pub use crate::pacer::{EventPacer, PacedEvents, PacerConfig, PacerError, PacerState};
    pub use futures::StreamExt;
}
