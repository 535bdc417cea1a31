use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const CONFIG_FILE: &str = ".mr-approve.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration loaded from .mr-approve.toml.
/// All fields are optional; the tool works with environment variables alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gitlab: GitLabConfig,
}

/// Settings handed to `GitLabClient::new`. The client never reads the
/// environment itself.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabConfig {
    /// Instance address or API root (e.g. `https://gitlab.example.com`).
    /// Falls back to `GITLAB_API_URL`, then to gitlab.com.
    pub base_url: Option<String>,

    /// Personal access token. Falls back to `GITLAB_PERSONAL_ACCESS_TOKEN`.
    pub token: Option<String>,

    /// Request timeout in seconds, passed straight to the HTTP client.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for GitLabConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Load configuration from .mr-approve.toml in the current directory,
    /// or the defaults if the file doesn't exist, then fill unset values
    /// from the environment.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        let mut config = if path.exists() {
            Self::load_from(path)?
        } else {
            Config::default()
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from a specific path without touching the environment.
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Fill unset GitLab settings from `lookup`. File values take precedence.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.gitlab.base_url.is_none() {
            self.gitlab.base_url = lookup("GITLAB_API_URL");
        }
        if self.gitlab.token.is_none() {
            self.gitlab.token = lookup("GITLAB_PERSONAL_ACCESS_TOKEN");
        }
    }
}
