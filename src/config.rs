//! # Service Configuration
//!
//! Everything is optional; a missing file section falls back to the
//! built-in demo defaults.
//!
//! ## Example: TOML Configuration
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:8081"
//! log_level = "debug"
//!
//! [security]
//! bcrypt_cost = 12
//! max_failed_attempts = 5
//! failure_window_secs = 60
//!
//! [[seed_accounts]]
//! username = "ops"
//! password = "change-me"
//! roles = ["ADMIN", "READ"]
//! ```
//!
//! Declaring any `[[seed_accounts]]` replaces the default seed set.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::directory::password::{MAX_COST, MIN_COST};
use crate::directory::{Role, SeedAccount};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default = "default_seed_accounts")]
    pub seed_accounts: Vec<SeedAccountConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            security: SecurityConfig::default(),
            seed_accounts: default_seed_accounts(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SecurityConfig {
    /// bcrypt work factor.
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
    /// Failed authentications allowed per client IP within the window.
    #[serde(default = "default_max_failed_attempts")]
    pub max_failed_attempts: u32,
    #[serde(default = "default_failure_window_secs")]
    pub failure_window_secs: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: default_bcrypt_cost(),
            max_failed_attempts: default_max_failed_attempts(),
            failure_window_secs: default_failure_window_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SeedAccountConfig {
    pub username: String,
    pub password: String,
    pub roles: Vec<String>,
}

impl From<&SeedAccountConfig> for SeedAccount {
    fn from(cfg: &SeedAccountConfig) -> Self {
        SeedAccount {
            username: cfg.username.clone(),
            password: cfg.password.clone(),
            roles: cfg.roles.clone(),
        }
    }
}

impl Config {
    pub fn seed_accounts(&self) -> Vec<SeedAccount> {
        self.seed_accounts.iter().map(SeedAccount::from).collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let security = &self.security;
        if !(MIN_COST..=MAX_COST).contains(&security.bcrypt_cost) {
            return Err(ConfigError::Invalid(format!(
                "bcrypt_cost must be between {} and {}",
                MIN_COST, MAX_COST
            )));
        }
        if security.max_failed_attempts == 0 {
            return Err(ConfigError::Invalid("max_failed_attempts must be > 0".to_string()));
        }
        if security.failure_window_secs == 0 {
            return Err(ConfigError::Invalid("failure_window_secs must be > 0".to_string()));
        }
        if self.server.log_level.parse::<tracing::Level>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "unknown log_level '{}'",
                self.server.log_level
            )));
        }
        for seed in &self.seed_accounts {
            if seed.username.trim().is_empty() || seed.password.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "seed accounts need a username and password".to_string(),
                ));
            }
            if seed.roles.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "seed account '{}' has no roles",
                    seed.username
                )));
            }
            if let Some(bad) = seed.roles.iter().find(|r| r.parse::<Role>().is_err()) {
                return Err(ConfigError::Invalid(format!(
                    "seed account '{}' has unknown role '{}'",
                    seed.username, bad
                )));
            }
        }
        Ok(())
    }
}

// Default value functions
fn default_bind() -> String { "0.0.0.0:8081".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_bcrypt_cost() -> u32 { 10 }
fn default_max_failed_attempts() -> u32 { 5 }
fn default_failure_window_secs() -> u64 { 60 }
fn default_seed_accounts() -> Vec<SeedAccountConfig> {
    SeedAccount::defaults()
        .into_iter()
        .map(|s| SeedAccountConfig {
            username: s.username,
            password: s.password,
            roles: s.roles,
        })
        .collect()
}

/// Load and validate configuration from a TOML file at the given path.
pub fn load_config(path: &str) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        tracing::error!("Failed to read config file '{}': {}", path, e);
        ConfigError::Io(e)
    })?;
    let config: Config = toml::from_str(&contents).map_err(|e| {
        tracing::error!("Failed to parse config TOML: {}", e);
        ConfigError::Toml(e)
    })?;
    config.validate()?;
    Ok(config)
}
