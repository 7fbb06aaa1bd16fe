//! Connection configuration

use serde::{Deserialize, Serialize};

use crate::core::errors::{ApiError, Result};

/// Default Smartling API host
pub const DEFAULT_BASE_URL: &str = "https://api.smartling.com";

/// Proxy settings for outbound requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfiguration {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ProxyConfiguration {
    /// Create proxy settings without credentials
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            username: None,
            password: None,
        }
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Proxy URL in the form reqwest expects
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Configuration for the API client
///
/// All values are supplied by the caller. The client never reads the
/// environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub base_url: String,
    pub project_id: String,
    pub proxy: Option<ProxyConfiguration>,
    pub timeout_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            project_id: String::new(),
            proxy: None,
            timeout_ms: 30000,
        }
    }
}

impl ConnectionConfig {
    /// Create a configuration for the given host and project
    pub fn new(base_url: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            project_id: project_id.into(),
            ..Default::default()
        }
    }

    pub fn with_proxy(mut self, proxy: ProxyConfiguration) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(ApiError::InvalidParameter {
                name: "base_url".to_string(),
            });
        }

        if self.project_id.is_empty() {
            return Err(ApiError::InvalidParameter {
                name: "project_id".to_string(),
            });
        }

        if self.timeout_ms == 0 {
            return Err(ApiError::InvalidParameter {
                name: "timeout_ms".to_string(),
            });
        }

        Ok(())
    }

    /// Root of the files API for the configured project
    pub(crate) fn files_api_root(&self) -> String {
        format!(
            "{}/files-api/v2/projects/{}",
            self.base_url.trim_end_matches('/'),
            self.project_id
        )
    }

    /// Root of the authentication API
    pub(crate) fn auth_api_root(&self) -> String {
        format!("{}/auth-api/v2", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        let config = ConnectionConfig::new("https://api.smartling.com", "testProject");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_missing_project() {
        let config = ConnectionConfig::new("https://api.smartling.com", "");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_files_api_root_strips_trailing_slash() {
        let config = ConnectionConfig::new("https://api.smartling.com/", "testProject");
        assert_eq!(
            config.files_api_root(),
            "https://api.smartling.com/files-api/v2/projects/testProject"
        );
    }
}
