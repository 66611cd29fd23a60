//! Clock-paced viewing event streams.
//!
//! An [`EventPacer`] turns a resolved [`Movie`] into an unbounded stream of
//! [`ViewingEvent`]s delivered at most once per interval. There is no rate
//! limiting in the event construction itself: the stream pairs two
//! independent progressions and the clock side is the only throttle.
//!
//! ```text
//!  ticks:       ─────0─────1─────2─────3──▶   (interval_at(now + period, period))
//!  candidates:  ●●●●●●●●●●●●●●●●●●●●●●●●●●▶   (always ready, built on demand)
//!                    │     │     │     │
//!  paired:      ─────E0────E1────E2────E3─▶   (tick index dropped, event kept)
//! ```
//!
//! # Pairing
//!
//! [`TickPaired`] waits for the next tick and only then pulls one candidate,
//! so each event's `user` and `when` are drawn at the moment it is emitted.
//!
//! # Buffering
//!
//! At most one tick is held while waiting for a candidate. Ticks missed by a
//! slow consumer stay in the interval (`MissedTickBehavior::Burst`) and are
//! released back to back on the following polls; none are dropped. The
//! backlog is deadline arithmetic inside the interval, not a queue.
//!
//! # Lifecycle
//!
//! ```text
//! Idle ──first poll──▶ Emitting ──drop / stop()──▶ Stopped
//! ```
//!
//! The interval is created on the first poll and deregistered from the timer
//! as soon as the stream is dropped or stopped.
//!
//! # Example
//!
//! ```no_run
//! use fluxflix_core::environment::SystemClock;
//! use fluxflix_core::movie::Movie;
//! use fluxflix_core::pacer::{EventPacer, PacerConfig};
//! use futures::StreamExt;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pacer = EventPacer::new(PacerConfig::default(), Arc::new(SystemClock))?;
//! let mut events = pacer.open(Movie::new("1", "Aeon Flux", "action"));
//!
//! while let Some(event) = events.next().await {
//!     println!("{} is watching {}", event.user, event.movie.title);
//! }
//! # Ok(())
//! # }
//! ```

use crate::environment::Clock;
use crate::movie::{Movie, MovieId, ViewingEvent};
use futures::stream::{self, BoxStream, Stream, StreamExt};
use rand::seq::SliceRandom;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll, ready};
use std::time::Duration;
use thiserror::Error;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Default delay between two events of one stream.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Default viewer identifiers.
pub const DEFAULT_USERS: [&str; 3] = ["rbleek", "dgeurts", "pnederlof"];

/// Errors raised while building a pacer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PacerError {
    /// The configuration cannot produce a paced stream.
    #[error("Invalid pacer configuration: {0}")]
    InvalidConfig(String),
}

/// Pacer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacerConfig {
    /// Delay between two ticks (and therefore two events)
    pub interval: Duration,
    /// Identifiers a viewer is drawn from
    pub users: Vec<String>,
}

impl Default for PacerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            users: DEFAULT_USERS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl PacerConfig {
    /// Override the tick interval.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Override the viewer set.
    #[must_use]
    pub fn with_users<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.users = users.into_iter().map(Into::into).collect();
        self
    }

    fn validate(&self) -> Result<(), PacerError> {
        if self.interval.is_zero() {
            return Err(PacerError::InvalidConfig(
                "interval must be greater than zero".to_string(),
            ));
        }
        if self.users.is_empty() {
            return Err(PacerError::InvalidConfig(
                "at least one user is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Factory for paced viewing event streams.
///
/// Cheap to clone; all clones share the active stream counter.
#[derive(Clone)]
pub struct EventPacer {
    config: Arc<PacerConfig>,
    clock: Arc<dyn Clock>,
    active: Arc<AtomicUsize>,
}

impl std::fmt::Debug for EventPacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventPacer")
            .field("config", &self.config)
            .field("active", &self.active_streams())
            .finish_non_exhaustive()
    }
}

impl EventPacer {
    /// Create a pacer.
    ///
    /// # Errors
    ///
    /// Returns [`PacerError::InvalidConfig`] for a zero interval or an empty
    /// user set.
    pub fn new(config: PacerConfig, clock: Arc<dyn Clock>) -> Result<Self, PacerError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            clock,
            active: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Open a stream of events for `movie`.
    ///
    /// Nothing is scheduled until the returned stream is first polled.
    #[must_use]
    pub fn open(&self, movie: Movie) -> PacedEvents {
        let movie_id = movie.id.clone();
        let ticks = tick_source(self.config.interval);

        let config = Arc::clone(&self.config);
        let clock = Arc::clone(&self.clock);
        let candidates =
            stream::repeat_with(move || candidate_event(&movie, &config.users, clock.as_ref()));

        let inner = TickPaired::new(ticks, candidates)
            .map(|(_tick, event)| event)
            .boxed();

        PacedEvents {
            inner,
            state: PacerState::Idle,
            movie_id,
            active: Arc::clone(&self.active),
        }
    }

    /// Number of streams currently emitting.
    #[must_use]
    pub fn active_streams(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    /// Configured tick interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.config.interval
    }
}

/// Periodic counter: `0, 1, 2, ...`, the first one a full `period` after the
/// stream is first polled.
fn tick_source(period: Duration) -> BoxStream<'static, u64> {
    stream::unfold((None::<Interval>, 0_u64), move |(interval, tick)| async move {
        let mut interval = interval.unwrap_or_else(|| {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
            interval
        });
        interval.tick().await;
        Some((tick, (Some(interval), tick + 1)))
    })
    .boxed()
}

fn candidate_event(movie: &Movie, users: &[String], clock: &dyn Clock) -> ViewingEvent {
    let user = users
        .choose(&mut rand::thread_rng())
        .cloned()
        .unwrap_or_default();

    ViewingEvent {
        movie: movie.clone(),
        when: clock.now(),
        user,
    }
}

/// Pairs the Nth tick with the Nth candidate, in arrival order.
///
/// The candidate side is only polled once a tick is in hand. One tick is
/// buffered while the candidate side is pending; later ticks stay with the
/// tick source. Ends when either side ends.
pub struct TickPaired<T: Stream, C> {
    ticks: T,
    candidates: C,
    pending_tick: Option<T::Item>,
}

impl<T: Stream, C> TickPaired<T, C> {
    /// Pair `ticks` with `candidates`.
    pub const fn new(ticks: T, candidates: C) -> Self {
        Self {
            ticks,
            candidates,
            pending_tick: None,
        }
    }
}

impl<T, C> Stream for TickPaired<T, C>
where
    T: Stream + Unpin,
    T::Item: Unpin,
    C: Stream + Unpin,
{
    type Item = (T::Item, C::Item);

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if this.pending_tick.is_none() {
            match ready!(this.ticks.poll_next_unpin(cx)) {
                Some(tick) => this.pending_tick = Some(tick),
                None => return Poll::Ready(None),
            }
        }

        match ready!(this.candidates.poll_next_unpin(cx)) {
            Some(candidate) => Poll::Ready(this.pending_tick.take().map(|tick| (tick, candidate))),
            None => Poll::Ready(None),
        }
    }
}

/// Lifecycle of a [`PacedEvents`] stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacerState {
    /// Created, never polled; no timer registered
    Idle,
    /// Timer registered, events flowing
    Emitting,
    /// Cancelled; timer deregistered
    Stopped,
}

/// Unbounded stream of viewing events for one movie.
///
/// Never ends on its own. Dropping it (or calling [`PacedEvents::stop`])
/// deregisters its timer.
pub struct PacedEvents {
    inner: BoxStream<'static, ViewingEvent>,
    state: PacerState,
    movie_id: MovieId,
    active: Arc<AtomicUsize>,
}

impl std::fmt::Debug for PacedEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PacedEvents")
            .field("state", &self.state)
            .field("movie_id", &self.movie_id)
            .finish_non_exhaustive()
    }
}

impl PacedEvents {
    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> PacerState {
        self.state
    }

    /// Key of the movie this stream was opened for.
    #[must_use]
    pub const fn movie_id(&self) -> &MovieId {
        &self.movie_id
    }

    /// Cancel the stream. Subsequent polls return `None`.
    pub fn stop(&mut self) {
        if self.state == PacerState::Emitting {
            self.active.fetch_sub(1, Ordering::AcqRel);
            metrics::gauge!("fluxflix_event_streams_active").decrement(1.0);
            tracing::debug!(movie_id = %self.movie_id, "Event stream stopped");
        }
        self.state = PacerState::Stopped;
        // Drops the interval, which removes it from the timer.
        self.inner = stream::empty().boxed();
    }
}

impl Stream for PacedEvents {
    type Item = ViewingEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        match this.state {
            PacerState::Stopped => return Poll::Ready(None),
            PacerState::Idle => {
                this.state = PacerState::Emitting;
                this.active.fetch_add(1, Ordering::AcqRel);
                metrics::gauge!("fluxflix_event_streams_active").increment(1.0);
                tracing::debug!(movie_id = %this.movie_id, "Event stream subscribed");
            },
            PacerState::Emitting => {},
        }

        let polled = this.inner.poll_next_unpin(cx);
        if let Poll::Ready(Some(event)) = &polled {
            metrics::counter!("fluxflix_viewing_events_total").increment(1);
            tracing::trace!(movie_id = %this.movie_id, user = %event.user, "Viewing event emitted");
        }
        polled
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.state {
            PacerState::Stopped => (0, Some(0)),
            _ => (usize::MAX, None),
        }
    }
}

impl Drop for PacedEvents {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use std::collections::HashSet;

    /// Wall time that follows tokio's (pausable) clock.
    struct TokioClock {
        base: DateTime<Utc>,
        start: Instant,
    }

    impl TokioClock {
        fn new() -> Self {
            Self {
                base: DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                    .unwrap()
                    .with_timezone(&Utc),
                start: Instant::now(),
            }
        }
    }

    impl Clock for TokioClock {
        fn now(&self) -> DateTime<Utc> {
            self.base + chrono::Duration::from_std(self.start.elapsed()).unwrap()
        }
    }

    fn movie() -> Movie {
        Movie::new("1", "Aeon Flux", "action")
    }

    fn pacer(interval: Duration) -> EventPacer {
        EventPacer::new(
            PacerConfig::default().with_interval(interval),
            Arc::new(TokioClock::new()),
        )
        .unwrap()
    }

    #[test]
    fn rejects_zero_interval() {
        let err = EventPacer::new(
            PacerConfig::default().with_interval(Duration::ZERO),
            Arc::new(crate::environment::SystemClock),
        )
        .unwrap_err();
        assert!(matches!(err, PacerError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_empty_user_set() {
        let err = EventPacer::new(
            PacerConfig::default().with_users(Vec::<String>::new()),
            Arc::new(crate::environment::SystemClock),
        )
        .unwrap_err();
        assert!(matches!(err, PacerError::InvalidConfig(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn emits_events_for_the_opened_movie() {
        let pacer = pacer(Duration::from_secs(1));

        let events: Vec<ViewingEvent> = pacer.open(movie()).take(5).collect().await;

        assert_eq!(events.len(), 5);
        assert!(events.iter().all(|e| e.movie == movie()));
    }

    #[tokio::test(start_paused = true)]
    async fn never_exceeds_tick_rate() {
        let interval = Duration::from_secs(1);
        let pacer = pacer(interval);
        let mut events = pacer.open(movie());

        let start = Instant::now();
        for n in 1..=5_u32 {
            events.next().await.expect("stream is unbounded");
            let elapsed = start.elapsed();
            assert!(elapsed >= interval * n, "event {n} arrived after {elapsed:?}");
            assert!(elapsed < interval * (n + 1));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn timestamps_are_taken_at_emission() {
        let interval = Duration::from_secs(1);
        let pacer = pacer(interval);
        let mut events = pacer.open(movie());

        // Idle time before the first poll must not be reflected in the events.
        time::sleep(Duration::from_secs(10)).await;

        let first = events.next().await.unwrap();
        let second = events.next().await.unwrap();
        let third = events.next().await.unwrap();

        assert!(first.when < second.when && second.when < third.when);
        assert_eq!(second.when - first.when, chrono::Duration::seconds(1));
        assert_eq!(third.when - second.when, chrono::Duration::seconds(1));
    }

    #[tokio::test(start_paused = true)]
    async fn users_come_from_the_configured_set() {
        let pacer = pacer(Duration::from_millis(1));
        let allowed: HashSet<&str> = DEFAULT_USERS.into_iter().collect();

        let events: Vec<ViewingEvent> = pacer.open(movie()).take(300).collect().await;
        let seen: HashSet<&str> = events.iter().map(|e| e.user.as_str()).collect();

        assert!(seen.is_subset(&allowed));
        assert_eq!(seen, allowed, "every user should appear over 300 draws");
    }

    #[tokio::test(start_paused = true)]
    async fn lifecycle_and_active_count() {
        let pacer = pacer(Duration::from_secs(1));
        let mut events = pacer.open(movie());

        assert_eq!(events.state(), PacerState::Idle);
        assert_eq!(pacer.active_streams(), 0);

        events.next().await.unwrap();
        assert_eq!(events.state(), PacerState::Emitting);
        assert_eq!(pacer.active_streams(), 1);

        drop(events);
        assert_eq!(pacer.active_streams(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_stream_is_never_counted() {
        let pacer = pacer(Duration::from_secs(1));
        let events = pacer.open(movie());
        drop(events);
        assert_eq!(pacer.active_streams(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_production() {
        let interval = Duration::from_secs(1);
        let pacer = pacer(interval);
        let mut events = pacer.open(movie());

        for _ in 0..3 {
            events.next().await.unwrap();
        }
        events.stop();

        assert_eq!(events.state(), PacerState::Stopped);
        assert_eq!(pacer.active_streams(), 0);

        let after = time::timeout(interval * 2, events.next()).await;
        assert!(matches!(after, Ok(None)), "no event after cancellation");
    }

    #[tokio::test(start_paused = true)]
    async fn slow_consumer_keeps_missed_ticks() {
        let interval = Duration::from_secs(1);
        let pacer = pacer(interval);
        let mut events = pacer.open(movie());

        events.next().await.unwrap();
        time::sleep(Duration::from_millis(3_500)).await;

        // Ticks at 2s, 3s and 4s were missed and come out back to back.
        let caught_up_at = Instant::now();
        for _ in 0..3 {
            events.next().await.unwrap();
        }
        assert_eq!(caught_up_at.elapsed(), Duration::ZERO);

        events.next().await.unwrap();
        assert_eq!(caught_up_at.elapsed(), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn streams_are_independent() {
        let pacer = pacer(Duration::from_secs(1));
        let other = Movie::new("2", "The Fluxinator", "drama");

        let mut first = pacer.open(movie());
        let mut second = pacer.open(other.clone());

        let (a, b) = tokio::join!(first.next(), second.next());
        assert_eq!(a.unwrap().movie, movie());
        assert_eq!(b.unwrap().movie, other);
        assert_eq!(pacer.active_streams(), 2);

        drop(first);
        assert_eq!(pacer.active_streams(), 1);
    }

    #[tokio::test]
    async fn tick_paired_waits_for_ticks() {
        let ticks = stream::iter(vec![10_u64, 11]);
        let candidates = stream::repeat_with(|| "candidate");

        let paired: Vec<_> = TickPaired::new(ticks, candidates).collect().await;

        assert_eq!(paired, vec![(10, "candidate"), (11, "candidate")]);
    }

    #[tokio::test]
    async fn tick_paired_ends_with_candidates() {
        let ticks = stream::iter(0_u64..);
        let candidates = stream::iter(vec!['a', 'b']);

        let paired: Vec<_> = TickPaired::new(ticks, candidates).collect().await;

        assert_eq!(paired, vec![(0, 'a'), (1, 'b')]);
    }
}
