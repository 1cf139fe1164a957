use anyhow::{anyhow, Result};
use formdraft_client::ClientConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "formdraft.config.json";

/// Overrides `apiUrl` from the config file
pub const API_URL_ENV: &str = "FORMDRAFT_API_URL";

/// Formdraft configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Base URL of the form service
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Name of the environment variable holding the bearer token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_token_env() -> String {
    "FORMDRAFT_TOKEN".to_string()
}

fn default_timeout_secs() -> u64 {
    formdraft_client::config::DEFAULT_TIMEOUT_SECS
}

impl Config {
    /// Load config from a directory, then apply environment overrides
    pub fn load(cwd: &str) -> Result<Self> {
        let config = Self::load_file(cwd)?;
        Ok(config.with_env(|name| std::env::var(name).ok()))
    }

    fn load_file(cwd: &str) -> Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| anyhow!("Invalid {}: {}", DEFAULT_CONFIG_NAME, e))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(API_URL_ENV).filter(|u| !u.trim().is_empty()) {
            self.api_url = url;
        }
        self
    }

    /// Client settings, reading the token from the configured variable
    pub fn client_config(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<ClientConfig> {
        let token = lookup(&self.token_env)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No API token: set {} (or use --offline)",
                    self.token_env
                )
            })?;

        Ok(ClientConfig::new(self.api_url.clone(), token).with_timeout_secs(self.timeout_secs))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token_env: default_token_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
