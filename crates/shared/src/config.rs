//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Association hydration configuration.
    #[serde(default)]
    pub hydration: HydrationConfig,
    /// Audit attribution configuration.
    #[serde(default)]
    pub audit: AuditConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Association hydration configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HydrationConfig {
    /// Issue association fetches concurrently within one read snapshot.
    ///
    /// Sequential fetching is the default.
    #[serde(default)]
    pub concurrent_fetches: bool,
}

/// Audit attribution configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Principal recorded when no acting user is present.
    #[serde(default = "default_system_principal")]
    pub system_principal: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            system_principal: default_system_principal(),
        }
    }
}

fn default_system_principal() -> String {
    "system".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("ROSTER").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
