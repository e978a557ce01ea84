//! Configuration loading and types
//!
//! Settings come from an optional TOML file, then the `API_BASE_URL` and
//! `API_HOST_TOKEN` environment variables, then command-line flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;
use eyre::{WrapErr, bail, eyre};
use serde::{Deserialize, Serialize};
use skyline_core::{LocalFailurePolicy, SchedulerConfig};
use url::Url;

/// Environment variable holding the inventory service base URL
pub const BASE_URL_ENV: &str = "API_BASE_URL";
/// Environment variable holding the host authentication token
pub const HOST_TOKEN_ENV: &str = "API_HOST_TOKEN";

/// Top-level configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Inventory service connection
    #[serde(default)]
    pub api: ApiConfig,
    /// Reconciliation loop settings
    #[serde(default)]
    pub agent: AgentConfig,
    /// Logging settings
    #[serde(default)]
    pub log: LogConfig,
}

/// Inventory service connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the inventory API
    pub base_url: Option<String>,
    /// Opaque token identifying this host
    pub host_token: Option<String>,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            host_token: None,
            timeout_secs: default_request_timeout(),
        }
    }
}

/// Reconciliation loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Seconds between cycles
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    /// Upper bound for one package manager run, in seconds
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,
    /// Reaction to package manager failures
    #[serde(default)]
    pub on_local_failure: LocalFailurePolicy,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            command_timeout_secs: default_command_timeout(),
            on_local_failure: LocalFailurePolicy::default(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default filter when `RUST_LOG` is unset (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_request_timeout() -> u64 {
    30
}

fn default_interval() -> u64 {
    5
}

fn default_command_timeout() -> u64 {
    120
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Validated settings the agent runs with
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: Url,
    pub host_token: String,
    pub request_timeout: Duration,
    pub command_timeout: Duration,
    pub scheduler: SchedulerConfig,
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .wrap_err_with(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Load `explicit` if given, else the first existing default path, else defaults
    ///
    /// # Errors
    /// Returns error if the chosen file cannot be read or parsed
    pub fn load_default(explicit: Option<&Path>) -> eyre::Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        for path in default_paths() {
            if path.exists() {
                return Self::load(&path);
            }
        }

        Ok(Config::default())
    }

    /// Override connection settings from environment variables
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(BASE_URL_ENV) {
            self.api.base_url = Some(base_url);
        }
        if let Some(token) = lookup(HOST_TOKEN_ENV) {
            self.api.host_token = Some(token);
        }
    }

    /// Check required values and convert to runtime settings
    ///
    /// # Errors
    /// Returns error if the base URL or host token is missing or invalid, or
    /// if a duration is zero
    pub fn validate(&self) -> eyre::Result<Settings> {
        let raw_url = self.api.base_url.as_deref().ok_or_else(|| {
            eyre!("no api base url provided, set {BASE_URL_ENV} or api.base_url")
        })?;
        let base_url =
            Url::parse(raw_url).wrap_err_with(|| format!("invalid api base url {raw_url:?}"))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            bail!("api base url must be http or https, got {raw_url:?}");
        }

        let host_token = match self.api.host_token.as_deref() {
            Some(token) if !token.trim().is_empty() => token.to_string(),
            _ => bail!("no host token provided, set {HOST_TOKEN_ENV} or api.host_token"),
        };

        if self.agent.interval_secs == 0 {
            bail!("agent.interval_secs must be greater than zero");
        }
        if self.agent.command_timeout_secs == 0 {
            bail!("agent.command_timeout_secs must be greater than zero");
        }
        if self.api.timeout_secs == 0 {
            bail!("api.timeout_secs must be greater than zero");
        }

        Ok(Settings {
            base_url,
            host_token,
            request_timeout: Duration::from_secs(self.api.timeout_secs),
            command_timeout: Duration::from_secs(self.agent.command_timeout_secs),
            scheduler: SchedulerConfig {
                interval: Duration::from_secs(self.agent.interval_secs),
                on_local_failure: self.agent.on_local_failure,
            },
        })
    }
}

fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("skyline.toml"),
        PathBuf::from("/etc/skyline/skyline.toml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("skyline/skyline.toml"));
    }
    paths
}
