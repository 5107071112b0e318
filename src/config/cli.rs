use crate::config::site_config::SiteConfig;
use crate::utils::error::Result;
use crate::utils::validation::{validate_path, Validate};
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "portfolio")]
#[command(about = "Load portfolio content with retry, fast fallback and a session-gated welcome splash")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override the API base URL from the configuration
    #[arg(long)]
    pub api_url: Option<String>,

    /// Directory for durable state (theme, admin token)
    #[arg(long, default_value = "./.portfolio")]
    pub state_dir: String,

    /// Skip the welcome splash for this run
    #[arg(long)]
    pub skip_welcome: bool,

    /// Emit JSON log lines
    #[arg(long)]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Load every content domain and print the settled state as JSON
    Load,
    /// Fetch a single project by id
    Project { id: String },
    /// Re-fetch one content domain after the initial load
    Refresh { domain: String },
    /// Send a contact-form message
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        message: String,
    },
    /// Show or toggle the stored theme
    Theme {
        #[arg(long)]
        toggle: bool,
    },
    /// Store an admin token and verify it against the API
    Admin {
        #[arg(long)]
        token: Option<String>,
        #[arg(long)]
        sign_out: bool,
    },
}

impl CliConfig {
    /// File configuration (or defaults) with command-line overrides applied.
    pub fn site_config(&self) -> Result<SiteConfig> {
        let mut config = match &self.config {
            Some(path) => SiteConfig::from_file(path)?,
            None => SiteConfig::default(),
        };

        if let Some(api_url) = &self.api_url {
            config.api.base_url = api_url.clone();
        }
        if self.json_logs {
            config.logging.format = "json".to_string();
        }
        Ok(config)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("state_dir", &self.state_dir)?;
        if let Some(path) = &self.config {
            validate_path("config", path)?;
        }
        Ok(())
    }
}
