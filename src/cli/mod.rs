//! CLI module for the triage engine
//!
//! # Commands
//!
//! - `serve` - Start the HTTP server
//! - `rules` - Inspect routing rules (list, check)
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Start server with default config
//! triage serve
//!
//! # Where would a listing worth 6M go?
//! triage rules check --type PROPERTY_LISTING_REQUEST \
//!     --payload '{"propertyDetails": {"price": 6000000}}'
//!
//! # Generate shell completions
//! triage completions bash > ~/.bash_completion.d/triage
//! ```

pub mod completions;
pub mod config;
pub mod output;
pub mod rules;
pub mod serve;

pub use completions::handle_completions;
pub use config::handle_config_init;

use crate::config::TriageConfig;
use crate::store::RequestType;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Triage - request routing and triage engine
#[derive(Parser, Debug)]
#[command(
    name = "triage",
    version,
    about = "Request routing and triage engine for the marketplace back-office"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the triage server
    Serve(ServeArgs),
    /// Inspect routing rules
    #[command(subcommand)]
    Rules(RulesCommands),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "triage.toml")]
    pub config: PathBuf,

    /// Override server port
    #[arg(short, long, env = "TRIAGE_PORT")]
    pub port: Option<u16>,

    /// Override server host
    #[arg(short = 'H', long, env = "TRIAGE_HOST")]
    pub host: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "TRIAGE_LOG_LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum RulesCommands {
    /// List routing rules in priority order
    List(RulesListArgs),
    /// Show where a request would be routed
    Check(RulesCheckArgs),
}

#[derive(Args, Debug)]
pub struct RulesListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Only show active rules
    #[arg(long)]
    pub active: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = "triage.toml")]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct RulesCheckArgs {
    /// Request type (LEAD, PARTNER_APPLICATION, PROPERTY_LISTING_REQUEST,
    /// CONTACT_MESSAGE, PROPERTY_INQUIRY)
    #[arg(short = 't', long = "type")]
    pub request_type: RequestType,

    /// Request payload as JSON
    #[arg(short = 'd', long, default_value = "{}")]
    pub payload: String,

    /// Requester name visible to conditions on requesterInfo.name
    #[arg(long, default_value = "cli")]
    pub name: String,

    /// Requester phone visible to conditions on requesterInfo.phone
    #[arg(long, default_value = "0")]
    pub phone: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = "triage.toml")]
    pub config: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "triage.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

/// Load the config file if it exists, else defaults, then env overrides.
pub fn load_config(path: &Path) -> Result<TriageConfig, Box<dyn std::error::Error>> {
    let config = if path.exists() {
        TriageConfig::load(Some(path))?
    } else {
        tracing::debug!(path = %path.display(), "Config file not found, using defaults");
        TriageConfig::default()
    };
    let config = config.with_env_overrides();
    config.validate()?;
    Ok(config)
}
