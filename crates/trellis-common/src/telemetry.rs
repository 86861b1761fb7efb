//! Logging initialization
//!
//! Installs a `tracing` subscriber with an `EnvFilter` (overridable through
//! `RUST_LOG`) and a fmt layer, plain or JSON. Library code only emits events;
//! the embedding process decides whether and how to collect them.

use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Errors that can occur during logging initialization
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global subscriber could not be installed
    #[error("failed to initialize tracing subscriber: {0}")]
    SubscriberInit(String),
}

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset (e.g. "info")
    pub default_directive: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_directive: "info".to_string(),
            json: false,
        }
    }
}

/// Install the global tracing subscriber
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: LoggingConfig) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_directive));

    let result = if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
    };

    result.map_err(|e| TelemetryError::SubscriberInit(e.to_string()))
}
