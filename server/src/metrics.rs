//! Prometheus metrics for the FluxFlix server.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `fluxflix_viewing_events_total` - Viewing events emitted across all streams
//! - `fluxflix_catalog_lookups_total{outcome}` - Movie lookups by outcome
//!   (`found`, `not_found`, `unavailable`)
//!
//! ## Gauges
//! - `fluxflix_event_streams_active` - Event streams currently emitting

use axum::{Router, routing::get};
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use thiserror::Error;

/// Errors from metrics setup.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to install the Prometheus recorder
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Register all metric descriptions.
///
/// Call once at startup, after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(
        "fluxflix_viewing_events_total",
        "Total number of viewing events emitted across all streams"
    );
    describe_counter!(
        "fluxflix_catalog_lookups_total",
        "Total number of movie lookups by outcome (found, not_found, unavailable)"
    );
    describe_gauge!(
        "fluxflix_event_streams_active",
        "Current number of viewing event streams that are emitting"
    );

    tracing::debug!("Metrics registered");
}

/// Install the global Prometheus recorder and describe every metric.
///
/// # Errors
///
/// Returns [`MetricsError::Install`] if a global recorder is already installed.
pub fn install() -> Result<PrometheusHandle, MetricsError> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MetricsError::Install(e.to_string()))?;
    register_metrics();
    Ok(handle)
}

/// Router exposing `GET /metrics` in Prometheus text format.
pub fn metrics_router(handle: PrometheusHandle) -> Router {
    Router::new().route(
        "/metrics",
        get(move || {
            let handle = handle.clone();
            async move { handle.render() }
        }),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn metrics_route_renders_recorded_values() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, || {
            metrics::counter!("fluxflix_viewing_events_total").increment(3);
        });

        let response = metrics_router(handle)
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("fluxflix_viewing_events_total 3"), "{text}");
    }
}
