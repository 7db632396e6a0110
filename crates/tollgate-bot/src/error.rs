//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Registry error: {0}")]
    Registry(#[from] tollgate_registry::RegistryError),

    #[error("Risk error: {0}")]
    Risk(#[from] tollgate_risk::RiskError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] tollgate_telemetry::TelemetryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type AppResult<T> = Result<T, AppError>;
