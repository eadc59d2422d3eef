//! Configuration for moltbot.
//!
//! Loaded from YAML with a fallback chain:
//! 1. Explicit path if provided
//! 2. moltbot.yml in the current directory
//! 3. ~/.config/moltbot/moltbot.yml
//! 4. Defaults
//!
//! Every section is optional; missing keys keep their defaults.

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::{MOLTBOOK_API_KEY_ENV, MOLTBOOK_API_URL, MoltbookConfig, SortOrder};
use crate::decision::Persona;
use crate::scheduler::{RateLimitConfig, TickConfig};

/// Name used for the config file and directories.
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Log level used when RUST_LOG is not set.
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Log file path (defaults to the local data dir).
    #[serde(rename = "log-file")]
    pub log_file: Option<PathBuf>,

    /// Platform API settings.
    pub api: ApiConfig,

    /// Tick loop settings.
    pub agent: AgentConfig,

    /// Platform rate limits.
    pub limits: RateLimitConfig,

    /// Personality driving the default decision strategy.
    pub persona: Persona,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            log_file: None,
            api: ApiConfig::default(),
            agent: AgentConfig::default(),
            limits: RateLimitConfig::default(),
            persona: Persona::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // Explicit path takes precedence
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project config
        let project_config = PathBuf::from(format!("{}.yml", APP_NAME));
        if project_config.exists() {
            match Self::load_from_file(&project_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load {}: {}", project_config.display(), e);
                }
            }
        }

        // Try user config
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join(APP_NAME).join(format!("{}.yml", APP_NAME));
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.agent.fetch_limit == 0 {
            eyre::bail!("agent.fetch-limit must be > 0");
        }
        if self.agent.check_interval_secs == 0 {
            eyre::bail!("agent.check-interval-secs must be > 0");
        }
        if self.agent.error_cooldown_secs == 0 {
            eyre::bail!("agent.error-cooldown-secs must be > 0");
        }
        if self.limits.comment_window_secs == 0 {
            eyre::bail!("limits.comment-window-secs must be > 0");
        }
        if !(0.0..=1.0).contains(&self.persona.traits.introversion) {
            eyre::bail!("persona.traits.introversion must be between 0 and 1");
        }
        Ok(())
    }

    /// Log file location: configured path or `<data dir>/moltbot/logs/moltbot.log`.
    pub fn log_file_path(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_NAME)
                .join("logs")
                .join(format!("{}.log", APP_NAME))
        })
    }
}

/// Platform API settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the REST API.
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Environment variable holding the API key.
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// Timeout per HTTP call in milliseconds.
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: MOLTBOOK_API_URL.to_string(),
            api_key_env: MOLTBOOK_API_KEY_ENV.to_string(),
            timeout_ms: 30_000,
        }
    }
}

impl ApiConfig {
    pub fn to_client_config(&self) -> MoltbookConfig {
        MoltbookConfig {
            base_url: self.base_url.clone(),
            api_key_env: self.api_key_env.clone(),
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

/// Tick loop settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Seconds between ticks.
    #[serde(rename = "check-interval-secs")]
    pub check_interval_secs: u64,

    /// Pause after each action in milliseconds.
    #[serde(rename = "action-pause-ms")]
    pub action_pause_ms: u64,

    /// Seconds to wait after a failed tick.
    #[serde(rename = "error-cooldown-secs")]
    pub error_cooldown_secs: u64,

    /// Posts fetched per tick.
    #[serde(rename = "fetch-limit")]
    pub fetch_limit: usize,

    /// Listing order for the fetch.
    pub sort: SortOrder,

    /// Timeout for the decision strategy in milliseconds.
    #[serde(rename = "decide-timeout-ms")]
    pub decide_timeout_ms: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: 300,
            action_pause_ms: 2_000,
            error_cooldown_secs: 60,
            fetch_limit: 20,
            sort: SortOrder::New,
            decide_timeout_ms: 30_000,
        }
    }
}

impl AgentConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn to_tick_config(&self) -> TickConfig {
        TickConfig::new(self.check_interval(), Duration::from_millis(self.action_pause_ms))
            .with_error_cooldown(Duration::from_secs(self.error_cooldown_secs))
            .with_fetch(self.sort, self.fetch_limit)
            .with_decide_timeout(Duration::from_millis(self.decide_timeout_ms))
    }
}
