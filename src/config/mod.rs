//! Configuration module for the triage engine
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`TRIAGE_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use triage::config::TriageConfig;
//!
//! // Load defaults
//! let config = TriageConfig::default();
//! assert_eq!(config.server.port, 8080);
//!
//! // Parse from TOML
//! let toml = r#"
//! [server]
//! port = 9000
//! "#;
//! let config: TriageConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.server.port, 9000);
//! ```

pub mod error;
pub mod logging;
pub mod routing;
pub mod server;

pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use routing::RoutingConfig;
pub use server::ServerConfig;

use crate::directory::{Partner, PartnerRole, StaticDirectory};
use crate::routing::{RuleError, RuleStore};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Commented configuration written by `triage config init`.
pub const EXAMPLE_CONFIG: &str = include_str!("../../triage.example.toml");

/// Unified configuration for the triage server.
///
/// # Example
///
/// ```rust
/// use triage::config::TriageConfig;
///
/// let config = TriageConfig::default();
/// assert_eq!(config.server.host, "0.0.0.0");
/// assert_eq!(config.routing.partner_relations, "partner-relations-manager-1");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Fallback assignees and seed rules
    pub routing: RoutingConfig,
    /// Seed entries for the partner directory
    pub partners: Vec<Partner>,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            routing: RoutingConfig::default(),
            partners: default_partners(),
        }
    }
}

impl TriageConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supports TRIAGE_* environment variables for common settings.
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(port) = std::env::var("TRIAGE_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Ok(host) = std::env::var("TRIAGE_HOST") {
            self.server.host = host;
        }

        if let Ok(level) = std::env::var("TRIAGE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("TRIAGE_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation {
                field: "server.port".to_string(),
                message: "port must be non-zero".to_string(),
            });
        }

        self.logging.validate()?;
        self.routing.validate()?;

        let mut seen = HashSet::new();
        for (i, partner) in self.partners.iter().enumerate() {
            if partner.id.trim().is_empty() {
                return Err(ConfigError::Validation {
                    field: format!("partners[{}].id", i),
                    message: "id cannot be empty".to_string(),
                });
            }
            if !seen.insert(partner.id.as_str()) {
                return Err(ConfigError::DuplicateId {
                    section: "partners".to_string(),
                    id: partner.id.clone(),
                });
            }
        }

        Ok(())
    }

    /// Partner directory seeded from `[[partners]]`.
    pub fn directory(&self) -> StaticDirectory {
        StaticDirectory::from_partners(self.partners.iter().cloned())
    }

    /// Rule store seeded from `[[routing.rules]]`, in file order.
    pub fn rule_store(&self) -> Result<RuleStore, RuleError> {
        RuleStore::with_rules(self.routing.rules.clone())
    }
}

fn default_partners() -> Vec<Partner> {
    vec![
        Partner::new("admin-1", "Platform Admin", PartnerRole::Admin),
        Partner::new(
            "partner-relations-manager-1",
            "Partner Relations",
            PartnerRole::Manager,
        ),
        Partner::new(
            "customer-relations-manager-1",
            "Customer Relations",
            PartnerRole::Manager,
        ),
        Partner::new("listings-manager-1", "Listings Desk", PartnerRole::Manager),
        Partner::new("service-manager-1", "Services Desk", PartnerRole::Manager),
        Partner::new(
            "el-mottaheda-group",
            "El Mottaheda Group",
            PartnerRole::Partner,
        ),
    ]
}
