use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use resourcekit_db::{ConnectOpts, LimitCfg};
use serde::{Deserialize, Serialize};

/// Prefix of environment overrides, e.g. `RESOURCE_SERVER__SERVER__BIND_ADDR`.
pub const ENV_PREFIX: &str = "RESOURCE_SERVER__";

fn default_bind_addr() -> String {
    "127.0.0.1:8080".to_owned()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_shutdown_grace_secs() -> u64 {
    10
}

fn default_body_limit_bytes() -> usize {
    1024 * 1024
}

fn default_database_url() -> String {
    "sqlite://resource-server.db?mode=rwc".to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}

/// Top-level server configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub pagination: LimitCfg,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Requests running longer than this are answered with 504.
    pub request_timeout_secs: u64,
    /// How long in-flight requests may drain after a shutdown signal.
    pub shutdown_grace_secs: u64,
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            request_timeout_secs: default_request_timeout_secs(),
            shutdown_grace_secs: default_shutdown_grace_secs(),
            body_limit_bytes: default_body_limit_bytes(),
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_conns: Option<u32>,
    pub min_conns: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_conns: None,
            min_conns: None,
            acquire_timeout_secs: None,
            sqlx_logging: false,
        }
    }
}

impl DatabaseConfig {
    #[must_use]
    pub fn connect_opts(&self) -> ConnectOpts {
        ConnectOpts {
            max_conns: self.max_conns,
            min_conns: self.min_conns,
            acquire_timeout: self.acquire_timeout_secs.map(Duration::from_secs),
            sqlx_logging: self.sqlx_logging,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives; `RUST_LOG` wins when set.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Text,
        }
    }
}

/// Build the layered configuration: defaults, then the YAML file (if any), then environment.
#[must_use]
pub fn figment(path: Option<&Path>) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));
    if let Some(path) = path {
        figment = figment.merge(Yaml::file(path));
    }
    figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load the effective configuration.
///
/// # Errors
/// Returns an error if `path` does not exist, or if any layer has an unknown key or a value
/// of the wrong type.
pub fn load(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    if let Some(path) = path
        && !path.is_file()
    {
        anyhow::bail!("config file not found: {}", path.display());
    }

    let cfg: AppConfig = figment(path)
        .extract()
        .context("failed to load configuration")?;

    if cfg.pagination.default_page_size == 0
        || cfg.pagination.default_page_size > cfg.pagination.max_page_size
    {
        anyhow::bail!(
            "pagination.default_page_size must be between 1 and pagination.max_page_size ({})",
            cfg.pagination.max_page_size
        );
    }
    Ok(cfg)
}
