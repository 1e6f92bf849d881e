use crate::error::{QuadernoError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use uuid::Uuid;

pub const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_UNIT: &str = "L";

/// Configuration for quaderno, stored in .quaderno/config.json
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuadernoConfig {
    /// Unit used when a stock command does not name one (e.g. "L", "kg")
    #[serde(default = "default_unit")]
    pub default_unit: String,

    /// Operator recorded when a command leaves it blank
    #[serde(default)]
    pub default_operator: String,
}

fn default_unit() -> String {
    DEFAULT_UNIT.to_string()
}

impl Default for QuadernoConfig {
    fn default() -> Self {
        Self {
            default_unit: default_unit(),
            default_operator: String::new(),
        }
    }
}

impl QuadernoConfig {
    pub const KEYS: [&'static str; 2] = ["default-unit", "default-operator"];

    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(QuadernoError::Io)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&content)
            .map_err(|e| QuadernoError::Config(format!("{}: {}", config_path.display(), e)))
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(QuadernoError::Io)?;
        }

        let content = serde_json::to_string_pretty(self).map_err(QuadernoError::Serialization)?;
        let tmp = config_dir.join(format!(".config-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp, content).map_err(QuadernoError::Io)?;
        fs::rename(&tmp, config_dir.join(CONFIG_FILENAME)).map_err(QuadernoError::Io)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "default-unit" => Some(self.default_unit.clone()),
            "default-operator" => Some(self.default_operator.clone()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), String> {
        let value = value.trim();
        match key {
            "default-unit" => {
                if value.is_empty() {
                    return Err("default-unit cannot be empty".to_string());
                }
                self.default_unit = value.to_string();
            }
            "default-operator" => self.default_operator = value.to_string(),
            _ => {
                return Err(format!(
                    "Unknown config key: {} (expected one of: {})",
                    key,
                    Self::KEYS.join(", ")
                ))
            }
        }
        Ok(())
    }

    /// `operator` unless blank, else the configured default.
    pub fn operator_or_default(&self, operator: &str) -> String {
        let operator = operator.trim();
        if operator.is_empty() {
            self.default_operator.clone()
        } else {
            operator.to_string()
        }
    }

    pub fn unit_or_default(&self, unit: Option<&str>) -> String {
        match unit.map(str::trim) {
            Some(u) if !u.is_empty() => u.to_string(),
            _ => self.default_unit.clone(),
        }
    }
}
