use serde::{Deserialize, Serialize};

use super::actor::{ActorIdentity, Role};

/// Main configuration structure for the bankeu console
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Fiscal year used when a command does not pass one
    #[serde(default = "default_fiscal_year")]
    pub fiscal_year: i32,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Which backend serves proposals
    #[serde(default)]
    pub backend: BackendConfig,

    /// Document link configuration
    #[serde(default)]
    pub documents: DocumentsConfig,

    /// Acting identity for this session
    #[serde(default)]
    pub actor: ActorConfig,
}

const fn default_fiscal_year() -> i32 {
    2025
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fiscal_year: default_fiscal_year(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            backend: BackendConfig::default(),
            documents: DocumentsConfig::default(),
            actor: ActorConfig::default(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".bankeu/bankeu.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    /// sqlx connection URL for the configured path
    pub fn url(&self) -> String {
        if self.path.starts_with("sqlite:") {
            self.path.clone()
        } else {
            format!("sqlite:{}", self.path)
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files
    #[serde(default)]
    pub log_dir: Option<String>,

    /// Also log to the terminal (stderr)
    #[serde(default = "default_true")]
    pub enable_console: bool,

    /// Rotation policy for log files: daily, hourly, never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

const fn default_true() -> bool {
    true
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            enable_console: true,
            rotation: default_rotation(),
        }
    }
}

/// Backend kind serving proposals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Local `SQLite` database
    #[default]
    Sqlite,
    /// Remote REST API
    Http,
}

/// Backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,

    /// Base URL of the REST API (http backend only)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Bearer token for the REST API
    #[serde(default)]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_timeout_secs() -> u64 {
    30
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::default(),
            base_url: None,
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Where submitted proposal documents are served from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DocumentsConfig {
    #[serde(default = "default_documents_base_url")]
    pub base_url: String,
}

fn default_documents_base_url() -> String {
    "http://localhost:3001/uploads/bankeu".to_string()
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            base_url: default_documents_base_url(),
        }
    }
}

/// Acting identity, as resolved by the session layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ActorConfig {
    #[serde(default = "default_actor_id")]
    pub id: String,

    #[serde(default = "default_actor_name")]
    pub name: String,

    /// superadmin, verifier, institution_delegate or village
    #[serde(default = "default_actor_role")]
    pub role: String,

    /// Required for institution delegates
    #[serde(default)]
    pub institution_id: Option<String>,
}

fn default_actor_id() -> String {
    "local".to_string()
}

fn default_actor_name() -> String {
    "Local Verifier".to_string()
}

fn default_actor_role() -> String {
    "verifier".to_string()
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            id: default_actor_id(),
            name: default_actor_name(),
            role: default_actor_role(),
            institution_id: None,
        }
    }
}

impl ActorConfig {
    /// Convert to the identity handed to capability resolution.
    pub fn identity(&self) -> Option<ActorIdentity> {
        Some(ActorIdentity {
            id: self.id.clone(),
            name: self.name.clone(),
            role: Role::from_str(&self.role)?,
            institution_id: self.institution_id.clone(),
        })
    }
}
