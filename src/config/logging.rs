//! `[logging]` section
//!
//! A base level plus optional per-component overrides. Components are the
//! crate's own modules, so `routing = "debug"` traces rule matching without
//! turning on request-level noise from `api`.

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Modules that accept a per-component level.
pub const COMPONENTS: [&str; 9] = [
    "api",
    "cli",
    "config",
    "directory",
    "logging",
    "metrics",
    "notify",
    "routing",
    "store",
];

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable, for a terminal
    #[default]
    Pretty,
    /// One JSON object per event, for log shipping
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: {}. Use: pretty, json", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    /// Per-component levels, e.g. `{ routing = "debug", store = "info" }`
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub component_levels: BTreeMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            component_levels: BTreeMap::new(),
        }
    }
}

impl LoggingConfig {
    /// Reject unknown levels and components before they reach the filter,
    /// where a typo would silently match nothing.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        check_level("logging.level", &self.level)?;
        for (component, level) in &self.component_levels {
            if !COMPONENTS.contains(&component.as_str()) {
                return Err(ConfigError::Validation {
                    field: format!("logging.component_levels.{}", component),
                    message: format!("unknown component. Use one of: {}", COMPONENTS.join(", ")),
                });
            }
            check_level(&format!("logging.component_levels.{}", component), level)?;
        }
        Ok(())
    }
}

fn check_level(field: &str, level: &str) -> Result<(), ConfigError> {
    if LEVELS.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        Err(ConfigError::Validation {
            field: field.to_string(),
            message: format!("invalid level '{}'. Use: {}", level, LEVELS.join(", ")),
        })
    }
}
