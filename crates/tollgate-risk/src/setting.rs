//! Rule settings file (`risk_manager_setting.json`).
//!
//! A JSON object keyed by rule name; each value maps parameter names to
//! scalars. Rule state is never written here.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::RiskResult;
use crate::template::RuleSetting;

pub const SETTING_FILENAME: &str = "risk_manager_setting.json";

#[derive(Debug, Clone)]
pub struct SettingStore {
    path: PathBuf,
    settings: serde_json::Map<String, Value>,
}

impl SettingStore {
    /// Load settings from `path`. A missing file yields empty settings.
    pub fn load(path: impl Into<PathBuf>) -> RiskResult<Self> {
        let path = path.into();

        let settings = if path.exists() {
            let content = fs::read_to_string(&path)?;
            let settings: serde_json::Map<String, Value> = if content.trim().is_empty() {
                serde_json::Map::new()
            } else {
                serde_json::from_str(&content)?
            };
            info!(path = %path.display(), rules = settings.len(), "Risk settings loaded");
            settings
        } else {
            debug!(path = %path.display(), "No risk settings file, using defaults");
            serde_json::Map::new()
        };

        Ok(Self { path, settings })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Setting for `rule_name`, empty if none is stored.
    pub fn get(&self, rule_name: &str) -> RuleSetting {
        match self.settings.get(rule_name) {
            Some(Value::Object(setting)) => setting.clone(),
            Some(other) => {
                warn!(rule = rule_name, value = %other, "Ignoring non-object rule setting");
                RuleSetting::new()
            }
            None => RuleSetting::new(),
        }
    }

    pub fn set(&mut self, rule_name: &str, setting: RuleSetting) {
        self.settings
            .insert(rule_name.to_string(), Value::Object(setting));
    }

    /// Rule names with a stored setting, in file order.
    pub fn rule_names(&self) -> Vec<String> {
        self.settings.keys().cloned().collect()
    }

    /// Write all settings back as pretty JSON.
    pub fn save(&self) -> RiskResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(&self.settings)?;
        fs::write(&self.path, content)?;
        debug!(path = %self.path.display(), "Risk settings saved");
        Ok(())
    }
}
