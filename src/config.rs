//! Client configuration

use crate::error::{Error, Result};
use std::time::Duration;

/// Connection settings for the orchestration API
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API, e.g. `https://api.example.com/api/1.1`
    pub api_host: String,
    /// Bearer token sent with every request
    pub access_token: Option<String>,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// User agent reported to the server
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_host: "http://localhost:8080/api/1.1".to_string(),
            access_token: None,
            request_timeout_secs: 30,
            user_agent: format!("{}/{}", crate::NAME, crate::VERSION),
        }
    }
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.api_host.trim_end_matches('/')
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.api_host.starts_with("http://") || self.api_host.starts_with("https://")) {
            return Err(Error::Configuration(format!(
                "API host must be an http(s) URL, got '{}'",
                self.api_host
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Configuration(
                "request timeout must be at least one second".into(),
            ));
        }
        if self.access_token.as_deref().is_some_and(str::is_empty) {
            return Err(Error::Configuration("access token is empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = ClientConfig {
            api_host: "ftp://api".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ClientConfig {
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ClientConfig {
            access_token: Some(String::new()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_base_url_trims_slash() {
        let config = ClientConfig {
            api_host: "https://api.example.com/api/1.1/".into(),
            ..Default::default()
        };
        assert_eq!(config.base_url(), "https://api.example.com/api/1.1");
    }
}
