//! Events the engine publishes for UIs and monitors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rule::RuleData;

/// Source tag carried by every engine log event.
pub const LOG_SOURCE: &str = "RiskManager";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum RiskEvent {
    /// Snapshot of a rule after its state or parameters changed.
    Rule(RuleData),
    /// Raw denial message, for pop-up style notification.
    Notify(String),
    Log(LogData),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogData {
    pub msg: String,
    /// Rule that produced the message.
    pub rule: String,
    pub source: String,
    pub time: DateTime<Utc>,
}

impl LogData {
    pub fn new(rule: &str, msg: String) -> Self {
        Self {
            msg,
            rule: rule.to_string(),
            source: LOG_SOURCE.to_string(),
            time: Utc::now(),
        }
    }
}
