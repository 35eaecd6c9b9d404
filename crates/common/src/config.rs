//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Moderation configuration.
    #[serde(default)]
    pub moderation: ModerationConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Moderation and retention configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ModerationConfig {
    /// Email granted administrator rights at registration. Bootstrap for the
    /// first admin; further role management is out of scope.
    #[serde(default)]
    pub admin_email: Option<String>,
    /// Warning count at which the admin UI surfaces "threshold reached".
    /// Informational only; crossing it never auto-suspends.
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold: i32,
    /// Days violation history of a deleted account is retained before the
    /// sweeper anonymizes it.
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
    /// Seconds between retention sweep runs.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// Maximum archive entries scrubbed per sweep batch.
    #[serde(default = "default_sweep_chunk_size")]
    pub sweep_chunk_size: u64,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            admin_email: None,
            warning_threshold: default_warning_threshold(),
            retention_days: default_retention_days(),
            sweep_interval_secs: default_sweep_interval_secs(),
            sweep_chunk_size: default_sweep_chunk_size(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

const fn default_warning_threshold() -> i32 {
    5
}

const fn default_retention_days() -> i64 {
    365
}

const fn default_sweep_interval_secs() -> u64 {
    86400
}

const fn default_sweep_chunk_size() -> u64 {
    100
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `WAVE_ENV`)
    /// 3. Environment variables with `WAVE_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("WAVE_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("WAVE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("WAVE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moderation_defaults() {
        let config = ModerationConfig::default();
        assert_eq!(config.warning_threshold, 5);
        assert_eq!(config.retention_days, 365);
        assert_eq!(config.sweep_interval_secs, 86400);
        assert_eq!(config.sweep_chunk_size, 100);
    }
}
