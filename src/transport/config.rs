//! HTTP transport configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AtTaskError, Result};

/// Cookie jar file name, relative to the home directory.
pub const DEFAULT_COOKIE_FILE_NAME: &str = ".attask_cookiejar";

/// HTTP transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransportConfig {
    /// Pin connections to TLS 1.0. Some site-local SSL interceptors break
    /// anything newer.
    #[serde(default)]
    pub force_legacy_tls: bool,

    /// Verify server certificates. The AtTask deployments this talks to sit
    /// behind intercepting proxies, so verification is off by default.
    #[serde(default)]
    pub verify_tls: bool,

    /// User-Agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Cookie jar location (defaults to `$HOME/.attask_cookiejar`).
    #[serde(default)]
    pub cookie_file: Option<PathBuf>,
}

fn default_user_agent() -> String {
    format!(
        "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:28.0) AtTask-rs/{}",
        env!("CARGO_PKG_VERSION")
    )
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            force_legacy_tls: false,
            verify_tls: false,
            user_agent: default_user_agent(),
            cookie_file: None,
        }
    }
}

impl TransportConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.user_agent.trim().is_empty() {
            return Err(AtTaskError::Config("user_agent must not be empty".to_string()));
        }

        if let Some(path) = &self.cookie_file {
            if path.as_os_str().is_empty() {
                return Err(AtTaskError::Config(
                    "cookie_file must not be empty".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Resolve the cookie jar path, falling back to the home directory.
    pub fn cookie_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.cookie_file {
            return Ok(path.clone());
        }

        let home = dirs::home_dir()
            .filter(|dir| dir.is_dir())
            .ok_or_else(|| AtTaskError::Config("home directory not found".to_string()))?;

        Ok(home.join(DEFAULT_COOKIE_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TransportConfig::default();
        assert!(!config.force_legacy_tls);
        assert!(!config.verify_tls);
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_explicit_cookie_path_wins() {
        let config = TransportConfig {
            cookie_file: Some(PathBuf::from("/tmp/jar.json")),
            ..Default::default()
        };
        assert_eq!(config.cookie_path().unwrap(), PathBuf::from("/tmp/jar.json"));
    }

    #[test]
    fn test_empty_user_agent_rejected() {
        let config = TransportConfig {
            user_agent: "  ".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(AtTaskError::Config(_))));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: TransportConfig =
            serde_json::from_str(r#"{"force_legacy_tls": true}"#).unwrap();
        assert!(config.force_legacy_tls);
        assert!(config.cookie_file.is_none());
        assert!(!config.user_agent.is_empty());
    }
}
