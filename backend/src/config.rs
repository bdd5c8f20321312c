//! Configuration management for the RIMPE Invoice server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with RIMPE_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Document store configuration
    pub store: StoreConfig,

    /// Anonymous sign-in token configuration
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,

    /// PostgreSQL connection URL, required for the postgres backend
    #[serde(default)]
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Seed new, empty sessions with sample data
    pub seed_fixtures: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Secret key for signing JWT tokens
    pub secret: String,

    /// Token lifetime in seconds
    pub token_expiry: i64,

    /// Seconds without a request before a session is closed
    pub session_idle_timeout: u64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("RIMPE_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("store.backend", "memory")?
            .set_default("store.url", "")?
            .set_default("store.max_connections", 10)?
            .set_default("store.min_connections", 2)?
            .set_default("store.seed_fixtures", false)?
            .set_default("auth.secret", "development-secret-key")?
            .set_default("auth.token_expiry", 86400)?
            .set_default("auth.session_idle_timeout", 3600)?
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            .add_source(
                Environment::with_prefix("RIMPE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.store.backend == StoreBackend::Postgres && self.store.url.trim().is_empty() {
            return Err(ConfigError::Message(
                "store.url is required when store.backend = \"postgres\"".to_string(),
            ));
        }
        if self.environment == "production" && self.auth.secret == "development-secret-key" {
            return Err(ConfigError::Message(
                "auth.secret must be set in production".to_string(),
            ));
        }
        Ok(())
    }

    /// In-memory configuration used by tests
    pub fn for_tests() -> Self {
        Self {
            environment: "test".to_string(),
            server: ServerConfig::default(),
            store: StoreConfig {
                backend: StoreBackend::Memory,
                url: String::new(),
                max_connections: 1,
                min_connections: 1,
                seed_fixtures: false,
            },
            auth: AuthConfig {
                secret: "test-secret".to_string(),
                token_expiry: 3600,
                session_idle_timeout: 3600,
            },
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}
