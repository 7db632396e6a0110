//! Application configuration.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tollgate_core::ContractData;
use tollgate_risk::RiskEngineConfig;

/// Top-level configuration, loaded from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Gateway that replayed order requests are routed through.
    #[serde(default = "default_gateway_name")]
    pub gateway_name: String,

    /// JSON Lines file of feed events.
    pub replay_file: PathBuf,

    /// Emit the Prometheus text dump after the replay.
    #[serde(default)]
    pub print_metrics: bool,

    #[serde(default)]
    pub risk: RiskEngineConfig,

    /// Contracts known before the replay starts.
    #[serde(default)]
    pub contracts: Vec<ContractData>,
}

fn default_gateway_name() -> String {
    "PAPER".to_string()
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> AppResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        if self.gateway_name.is_empty() {
            return Err(AppError::Config("gateway_name must not be empty".to_string()));
        }
        if let Some(contract) = self.contracts.iter().find(|c| c.pricetick.inner().is_sign_negative()) {
            return Err(AppError::Config(format!(
                "{}: pricetick must not be negative",
                contract.vt_symbol()
            )));
        }
        Ok(())
    }
}
