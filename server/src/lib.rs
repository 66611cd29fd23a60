//! FluxFlix server.
//!
//! Wires configuration, the catalog store, the event pacer and the HTTP
//! router together:
//!
//! - `DATABASE_URL` set: `PostgreSQL` catalog, migrated at startup
//! - `DATABASE_URL` unset: in-memory catalog
//! - optional startup seeding with the demo titles
//! - optional Prometheus exporter at `/metrics`
//!
//! See [`config::Config`] for every supported variable.

pub mod config;
pub mod metrics;
pub mod seed;

pub use config::{Config, ConfigError};

use anyhow::Context;
use axum::Router;
use fluxflix_core::catalog::CatalogStore;
use fluxflix_core::environment::SystemClock;
use fluxflix_core::pacer::{EventPacer, PacerConfig};
use fluxflix_postgres::PostgresCatalogStore;
use fluxflix_testing::InMemoryCatalogStore;
use fluxflix_web::{AppState, build_router};
use metrics_exporter_prometheus::PrometheusHandle;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::future::IntoFuture;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

/// Open the configured catalog store.
///
/// # Errors
///
/// Returns an error if `PostgreSQL` is configured but unreachable or its
/// migrations fail.
pub async fn open_catalog(config: &Config) -> anyhow::Result<Arc<dyn CatalogStore>> {
    match &config.database {
        Some(db) => {
            info!(max_connections = db.max_connections, "Connecting to PostgreSQL catalog");
            let store = PostgresCatalogStore::connect(&db.url, db.max_connections)
                .await
                .context("connecting to PostgreSQL")?;
            store.migrate().await.context("running catalog migrations")?;
            Ok(Arc::new(store))
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory catalog");
            Ok(Arc::new(InMemoryCatalogStore::new()))
        }
    }
}

/// Build the shared handler state: catalog (seeded if enabled) and pacer.
///
/// # Errors
///
/// Returns an error if the catalog cannot be opened or seeded, or if the
/// pacer configuration is invalid.
pub async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let catalog = open_catalog(config).await?;

    if config.seed {
        let mut rng = StdRng::from_entropy();
        let movies = seed::seed_catalog(catalog.as_ref(), &seed::DEMO_TITLES, &mut rng)
            .await
            .context("seeding catalog")?;
        info!(count = movies.len(), "Catalog seeded");
    }

    let pacer = EventPacer::new(
        PacerConfig::default().with_interval(config.events.interval),
        Arc::new(SystemClock),
    )
    .context("configuring event pacer")?;

    Ok(AppState::new(catalog, pacer).with_sse_keep_alive(config.events.sse_keep_alive))
}

/// Assemble the full router, adding `/metrics` when a handle is given.
pub fn build_app(state: AppState, metrics: Option<PrometheusHandle>) -> Router {
    let app = build_router(state);
    match metrics {
        Some(handle) => app.merge(metrics::metrics_router(handle)),
        None => app,
    }
}

/// Run the server until a shutdown signal arrives.
///
/// After the signal, open connections (including event streams) get
/// `server.shutdown_timeout` to finish before they are dropped.
///
/// # Errors
///
/// Returns an error if startup fails or the listener cannot be bound.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let handle = if config.metrics {
        Some(metrics::install()?)
    } else {
        None
    };

    let state = build_state(&config).await?;
    let app = build_app(state, handle);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("Server listening on {}", addr);

    let (signalled_tx, signalled_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = signalled_tx.send(());
        })
        .into_future();

    let grace = config.server.shutdown_timeout;
    let deadline = async move {
        if signalled_rx.await.is_ok() {
            tokio::time::sleep(grace).await;
        } else {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = server => result?,
        () = deadline => {
            warn!(timeout = ?grace, "Shutdown timeout elapsed, dropping open connections");
        }
    }

    info!("Server stopped");
    Ok(())
}

/// Graceful shutdown signal handler.
///
/// Waits for:
/// - Ctrl+C (SIGINT)
/// - SIGTERM (on unix)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use fluxflix_core::movie::Movie;
    use std::collections::HashMap;
    use tower::ServiceExt;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
    }

    async fn get_movies(app: Router) -> (StatusCode, Vec<Movie>) {
        let response = app
            .oneshot(Request::builder().uri("/movies").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn in_memory_state_is_seeded_with_demo_titles() {
        let state = build_state(&config(&[])).await.unwrap();

        assert_eq!(state.sse_keep_alive, Some(std::time::Duration::from_secs(15)));

        let (status, movies) = get_movies(build_app(state, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(movies.len(), seed::DEMO_TITLES.len());
        assert!(movies.iter().all(|m| seed::GENRES.contains(&m.genre.as_str())));
    }

    #[tokio::test]
    async fn seeding_can_be_disabled() {
        let state = build_state(&config(&[("FLUXFLIX_SEED", "false")]))
            .await
            .unwrap();

        let (status, movies) = get_movies(build_app(state, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(movies.is_empty());
    }

    #[tokio::test]
    async fn metrics_route_is_absent_without_handle() {
        let state = build_state(&config(&[("FLUXFLIX_SEED", "false")]))
            .await
            .unwrap();

        let response = build_app(state, None)
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
