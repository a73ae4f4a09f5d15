//! Session configuration.

use serde::{Deserialize, Serialize};
use url::Url;

use super::types::LoginMethod;
use crate::error::{AtTaskError, Result};
use crate::transport::TransportConfig;

/// Path segment separating the site root from the versioned API.
pub const API_PATH_MARKER: &str = "attask/api";

/// Endpoint probed to check whether the cookie is still accepted. It answers
/// 200 for any authenticated user.
pub const AUTH_PROBE_ENDPOINT: &str = "/project/count?status=CUR";

/// Session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Versioned API URL, e.g. `https://acme.attask-ondemand.com/attask/api/v4.0`.
    pub url: String,

    /// Login method.
    #[serde(default)]
    pub login_method: LoginMethod,

    /// HTTP transport settings.
    #[serde(default)]
    pub transport: TransportConfig,
}

impl SessionConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            login_method: LoginMethod::default(),
            transport: TransportConfig::default(),
        }
    }

    /// Pin the transport to TLS 1.0.
    pub fn with_legacy_tls(mut self, force: bool) -> Self {
        self.transport.force_legacy_tls = force;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(AtTaskError::Config("url is required".to_string()));
        }

        let parsed = Url::parse(&self.url)
            .map_err(|e| AtTaskError::Config(format!("invalid url {}: {}", self.url, e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(AtTaskError::Config(format!(
                "url must be http or https, got {}",
                parsed.scheme()
            )));
        }

        self.transport.validate()
    }

    /// API URL without a trailing slash.
    pub fn api_url(&self) -> String {
        self.url.trim_end_matches('/').to_string()
    }

    /// Site root: everything before the `attask/api` segment.
    pub fn base_url(&self) -> String {
        match self.url.find(API_PATH_MARKER) {
            Some(idx) => self.url[..idx].to_string(),
            None => self.url.clone(),
        }
    }

    /// URL of the authentication probe.
    pub fn probe_url(&self) -> String {
        format!("{}{}", self.api_url(), AUTH_PROBE_ENDPOINT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://acme.attask-ondemand.com/attask/api/v4.0";

    #[test]
    fn test_urls() {
        let config = SessionConfig::new(format!("{}/", URL));
        assert_eq!(config.api_url(), URL);
        assert_eq!(config.base_url(), "https://acme.attask-ondemand.com/");
        assert_eq!(
            config.probe_url(),
            "https://acme.attask-ondemand.com/attask/api/v4.0/project/count?status=CUR"
        );
    }

    #[test]
    fn test_base_url_without_marker() {
        let config = SessionConfig::new("https://proxy.example.com/api");
        assert_eq!(config.base_url(), "https://proxy.example.com/api");
    }

    #[test]
    fn test_validate() {
        assert!(SessionConfig::new(URL).validate().is_ok());
        assert!(SessionConfig::new("").validate().is_err());
        assert!(SessionConfig::new("not a url").validate().is_err());
        assert!(SessionConfig::new("ftp://acme.example.com/attask/api").validate().is_err());
    }

    #[test]
    fn test_with_legacy_tls() {
        let config = SessionConfig::new(URL).with_legacy_tls(true);
        assert!(config.transport.force_legacy_tls);
    }

    #[test]
    fn test_deserialize() {
        let config: SessionConfig = serde_json::from_str(&format!(
            r#"{{"url": "{}", "login_method": "saml", "transport": {{"force_legacy_tls": true}}}}"#,
            URL
        ))
        .unwrap();
        assert_eq!(config.login_method, LoginMethod::Saml);
        assert!(config.transport.force_legacy_tls);

        let unknown = serde_json::from_str::<SessionConfig>(&format!(
            r#"{{"url": "{}", "retries": 3}}"#,
            URL
        ));
        assert!(unknown.is_err());
    }
}
