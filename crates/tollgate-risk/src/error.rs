//! Risk error types.
//!
//! None of these surface from an allow/deny decision: they cover rule
//! configuration, settings persistence and engine setup.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RiskError {
    #[error("Invalid setting for rule {rule}: {reason}")]
    InvalidSetting { rule: String, reason: String },

    #[error("Unknown rule: {0}")]
    UnknownRule(String),

    #[error("Unknown rule class: {0}")]
    UnknownRuleClass(String),

    #[error("Duplicate rule name: {0}")]
    DuplicateRule(String),

    #[error("Settings file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type RiskResult<T> = Result<T, RiskError>;
