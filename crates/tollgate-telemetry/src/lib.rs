//! Structured logging and Prometheus metrics for tollgate.
//!
//! - Structured logging with tracing (JSON in production, pretty otherwise)
//! - Prometheus counters for risk checks, denials and rule updates

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{init_logging, init_logging_with, LogFormat};
pub use metrics::Metrics;
