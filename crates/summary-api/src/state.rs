//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the cart summary definition and process configuration.

use std::path::PathBuf;
use std::sync::Arc;
use summary_core::{Cart, ExtraRegistry, SummaryConfig, SummaryDefinition};
use tracing::{info, warn};

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Path to the extras/policy TOML file
    pub summary_config: PathBuf,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            summary_config: std::env::var("SUMMARY_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("config/summary.toml")),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Cart summary type served by the API
    pub definition: Arc<SummaryDefinition<Cart>>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create a new AppState from environment and the summary config file
    pub fn new() -> anyhow::Result<Self> {
        Self::from_config(AppConfig::from_env())
    }

    /// Create state for an already loaded process config
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let summary_config = load_summary_config(&config.summary_config)?;
        Self::with_summary_config(config, &summary_config)
    }

    /// Create state from an already loaded summary config
    pub fn with_summary_config(config: AppConfig, summary_config: &SummaryConfig) -> anyhow::Result<Self> {
        let definition = summary_config
            .definition("cart", &ExtraRegistry::empty())
            .map_err(|e| anyhow::anyhow!("Failed to build cart summary: {}", e))?;

        Ok(Self {
            definition: Arc::new(definition),
            config,
        })
    }
}

/// Load summary config from file, falling back to an empty configuration
fn load_summary_config(path: &std::path::Path) -> anyhow::Result<SummaryConfig> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let config = SummaryConfig::from_toml(&contents)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
            info!(
                "Loaded {} extras from {}",
                config.extras.len(),
                path.display()
            );
            Ok(config)
        }
        Err(e) => {
            warn!(
                "Could not read {} ({}), serving summaries without extras",
                path.display(),
                e
            );
            Ok(SummaryConfig::default())
        }
    }
}
