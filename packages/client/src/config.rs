use crate::ClientError;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for [`crate::HttpFormService`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the form service, e.g. `https://api.example.com`
    pub api_url: String,

    /// Bearer token; acquiring it is the caller's business
    pub token: String,

    pub timeout_secs: u64,
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            token: token.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> Result<String, ClientError> {
        let url = self.api_url.trim().trim_end_matches('/');

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "api url '{}' must start with http:// or https://",
                self.api_url
            )));
        }

        Ok(url.to_string())
    }
}
