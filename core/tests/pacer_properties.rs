//! Property tests for the event pacer.
//!
//! Each case runs on its own paused-clock runtime so that pacing is checked
//! against tokio's virtual time instead of wall time.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use fluxflix_core::environment::SystemClock;
use fluxflix_core::movie::{Movie, ViewingEvent};
use fluxflix_core::pacer::{EventPacer, PacerConfig};
use futures::StreamExt;
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;

fn paused_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .expect("runtime")
}

fn arb_movie() -> impl Strategy<Value = Movie> {
    ("[a-z0-9-]{1,36}", "[A-Za-z ]{1,40}", "horror|romcom|drama|action|docu")
        .prop_map(|(id, title, genre)| Movie::new(id, title, genre))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn every_event_carries_the_opened_movie(movie in arb_movie(), k in 1_usize..20) {
        let rt = paused_runtime();
        let pacer = EventPacer::new(
            PacerConfig::default().with_interval(Duration::from_millis(250)),
            Arc::new(SystemClock),
        )
        .unwrap();

        let events: Vec<ViewingEvent> =
            rt.block_on(pacer.open(movie.clone()).take(k).collect());

        prop_assert_eq!(events.len(), k);
        prop_assert!(events.iter().all(|e| e.movie == movie));
        prop_assert_eq!(pacer.active_streams(), 0);
    }

    #[test]
    fn nth_event_never_arrives_early(interval_ms in 1_u64..2_000, n in 1_u32..10) {
        let rt = paused_runtime();
        let interval = Duration::from_millis(interval_ms);
        let pacer = EventPacer::new(
            PacerConfig::default().with_interval(interval),
            Arc::new(SystemClock),
        )
        .unwrap();

        let elapsed = rt.block_on(async {
            let start = tokio::time::Instant::now();
            let mut events = pacer.open(Movie::new("1", "Aeon Flux", "action"));
            for _ in 0..n {
                events.next().await.expect("unbounded");
            }
            start.elapsed()
        });

        prop_assert!(elapsed >= interval * (n - 1));
    }
}
