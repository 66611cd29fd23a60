//! Configuration management for the FluxFlix server.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Malformed values are rejected rather than replaced by their default.

use std::env;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while reading configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but its value cannot be used.
    #[error("Invalid value {value:?} for {key}: {reason}")]
    Invalid {
        /// Environment variable name
        key: &'static str,
        /// Offending value
        value: String,
        /// What was expected
        reason: String,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Viewing event stream configuration
    pub events: EventsConfig,
    /// `PostgreSQL` configuration (`None` selects the in-memory catalog)
    pub database: Option<DatabaseConfig>,
    /// Replace the catalog with the demo titles at startup
    pub seed: bool,
    /// Install the Prometheus recorder and serve `/metrics`
    pub metrics: bool,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// How long to wait for open connections after a shutdown signal
    pub shutdown_timeout: Duration,
}

/// Viewing event stream configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventsConfig {
    /// Pacing interval between events
    pub interval: Duration,
    /// SSE keep-alive comment interval (`None` disables keep-alives)
    pub sse_keep_alive: Option<Duration>,
}

/// `PostgreSQL` configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Does not read `.env`; the binary loads it before tracing starts.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a variable holds a malformed value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a variable holds a malformed value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(&lookup);

        let interval_ms: u64 = vars.parsed("FLUXFLIX_EVENT_INTERVAL_MS", 1000)?;
        if interval_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "FLUXFLIX_EVENT_INTERVAL_MS",
                value: "0".to_string(),
                reason: "interval must be positive".to_string(),
            });
        }
        let keep_alive_secs: u64 = vars.parsed("FLUXFLIX_SSE_KEEP_ALIVE_SECS", 15)?;

        let database = match vars.get("DATABASE_URL") {
            Some(url) if !url.trim().is_empty() => Some(DatabaseConfig {
                url,
                max_connections: vars.parsed("DATABASE_MAX_CONNECTIONS", 10)?,
            }),
            _ => None,
        };

        Ok(Self {
            server: ServerConfig {
                host: vars
                    .get("FLUXFLIX_HOST")
                    .unwrap_or_else(|| "0.0.0.0".to_string()),
                port: vars.parsed("FLUXFLIX_PORT", 8080)?,
                shutdown_timeout: Duration::from_secs(
                    vars.parsed("FLUXFLIX_SHUTDOWN_TIMEOUT_SECS", 10)?,
                ),
            },
            events: EventsConfig {
                interval: Duration::from_millis(interval_ms),
                sse_keep_alive: (keep_alive_secs > 0)
                    .then_some(Duration::from_secs(keep_alive_secs)),
            },
            database,
            seed: vars.flag("FLUXFLIX_SEED", true)?,
            metrics: vars.flag("FLUXFLIX_METRICS", true)?,
        })
    }

    /// Socket address string for the HTTP listener.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

struct Vars<'a, F>(&'a F);

impl<F> Vars<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }

    fn parsed<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                key,
                value: raw.clone(),
                reason: e.to_string(),
            }),
        }
    }

    fn flag(&self, key: &'static str, default: bool) -> Result<bool, ConfigError> {
        let Some(raw) = self.get(key) else {
            return Ok(default);
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid {
                key,
                value: raw,
                reason: "expected true or false".to_string(),
            }),
        }
    }
}
