use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::{BackendKind, Config};
use crate::domain::models::Role;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("backend.base_url is required when backend.kind is http")]
    MissingBackendUrl,

    #[error("Invalid backend.timeout_secs: {0}. Must be at least 1")]
    InvalidTimeout(u64),

    #[error(
        "Invalid actor role: {0}. Expected superadmin, verifier, institution_delegate or village"
    )]
    InvalidRole(String),

    #[error("actor.institution_id is required for institution delegates")]
    MissingInstitution,

    #[error("Invalid fiscal_year: {0}. Must be between 2000 and 2100")]
    InvalidFiscalYear(i32),
}

/// Directory holding project configuration and the default database
pub const CONFIG_DIR: &str = ".bankeu";

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .bankeu/config.yaml (project config, created by init)
    /// 3. .bankeu/local.yaml (local overrides, optional)
    /// 4. Environment variables (BANKEU_* prefix, `__` for nesting)
    pub fn load() -> Result<Config> {
        Self::load_in(".")
    }

    /// Same as [`load`](Self::load) with the project rooted at `root`.
    pub fn load_in(root: impl AsRef<Path>) -> Result<Config> {
        let dir = root.as_ref().join(CONFIG_DIR);
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed("BANKEU_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honouring env overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("BANKEU_").split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if !(2000..=2100).contains(&config.fiscal_year) {
            return Err(ConfigError::InvalidFiscalYear(config.fiscal_year));
        }

        if config.database.path.trim().is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }
        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(config.database.max_connections));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }
        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        if config.backend.kind == BackendKind::Http
            && config.backend.base_url.as_deref().map_or(true, |u| u.trim().is_empty())
        {
            return Err(ConfigError::MissingBackendUrl);
        }
        if config.backend.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(config.backend.timeout_secs));
        }

        let role = Role::from_str(&config.actor.role)
            .ok_or_else(|| ConfigError::InvalidRole(config.actor.role.clone()))?;
        if role == Role::InstitutionDelegate
            && config.actor.institution_id.as_deref().map_or(true, |id| id.trim().is_empty())
        {
            return Err(ConfigError::MissingInstitution);
        }

        Ok(())
    }
}
