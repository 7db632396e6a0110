//! Structured logging initialization.
//!
//! Output format comes from `TOLLGATE_LOG_FORMAT` (`json`, `pretty` or
//! `compact`). Without it, `RUST_ENV=production` selects JSON and anything
//! else selects pretty output. `RUST_LOG` overrides [`DEFAULT_FILTER`].

use crate::error::{TelemetryError, TelemetryResult};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,tollgate=debug";

/// Environment variable naming the log format.
pub const LOG_FORMAT_ENV: &str = "TOLLGATE_LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event, with span context.
    Json,
    /// Multi-line human output.
    Pretty,
    /// Single-line human output, handy for long replays.
    Compact,
}

impl LogFormat {
    /// Pick a format from an explicit setting and the `RUST_ENV` value.
    ///
    /// An unrecognised explicit setting falls through to the `RUST_ENV` rule.
    pub fn resolve(explicit: Option<&str>, rust_env: Option<&str>) -> Self {
        match explicit.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("json") => return Self::Json,
            Some("pretty") => return Self::Pretty,
            Some("compact") => return Self::Compact,
            _ => {}
        }

        if rust_env == Some("production") {
            Self::Json
        } else {
            Self::Pretty
        }
    }

    pub fn from_env() -> Self {
        let explicit = std::env::var(LOG_FORMAT_ENV).ok();
        let rust_env = std::env::var("RUST_ENV").ok();
        Self::resolve(explicit.as_deref(), rust_env.as_deref())
    }
}

/// Install the global subscriber in the format chosen by [`LogFormat::from_env`].
///
/// Fails if a subscriber is already installed.
pub fn init_logging() -> TelemetryResult<()> {
    init_logging_with(LogFormat::from_env())
}

/// Install the global subscriber in `format`.
pub fn init_logging_with(format: LogFormat) -> TelemetryResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_target(true))
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_target(false))
            .try_init(),
    };

    result.map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}
