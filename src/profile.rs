//! Named connection profiles loaded from a TOML file.
//!
//! ```toml
//! [Production]
//! url = "https://acme.attask-ondemand.com/attask/api/v4.0"
//! username = "jdoe"
//! password = "hunter2"
//! domain = "CORP"
//! force_legacy_tls = true
//! ```

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::error::{AtTaskError, Result};
use crate::session::{LoginMethod, SessionConfig};

/// Default profile section name.
pub const DEFAULT_PROFILE: &str = "Production";

/// One profile section. Every field is optional so the command line can
/// fill in the rest.
#[derive(Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub domain: Option<String>,

    #[serde(default)]
    pub force_legacy_tls: bool,

    #[serde(default)]
    pub login_method: LoginMethod,
}

impl std::fmt::Debug for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profile")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("domain", &self.domain)
            .field("force_legacy_tls", &self.force_legacy_tls)
            .field("login_method", &self.login_method)
            .finish()
    }
}

impl Profile {
    /// Session configuration for this profile.
    pub fn session_config(&self) -> Result<SessionConfig> {
        let url = self
            .url
            .as_deref()
            .ok_or_else(|| AtTaskError::Config("profile has no url".to_string()))?;

        let mut config = SessionConfig::new(url).with_legacy_tls(self.force_legacy_tls);
        config.login_method = self.login_method;
        config.validate()?;
        Ok(config)
    }
}

/// All profiles in a file, keyed by section name.
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct Profiles(HashMap<String, Profile>);

impl Profiles {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| AtTaskError::Config(format!("invalid profile file: {}", e)))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AtTaskError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn get(&self, name: &str) -> Result<&Profile> {
        self.0
            .get(name)
            .ok_or_else(|| AtTaskError::Config(format!("profile {} not found", name)))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const PROFILES: &str = r#"
        [Production]
        url = "https://acme.attask-ondemand.com/attask/api/v4.0"
        username = "jdoe"
        password = "hunter2"
        domain = "CORP"
        force_legacy_tls = true

        [Sandbox]
        url = "https://acme.attasksandbox.com/attask/api/v4.0"
        login_method = "basic"
    "#;

    #[test]
    fn test_parse_profiles() {
        let profiles = Profiles::from_toml(PROFILES).unwrap();

        let prod = profiles.get(DEFAULT_PROFILE).unwrap();
        assert_eq!(prod.username.as_deref(), Some("jdoe"));
        assert_eq!(prod.domain.as_deref(), Some("CORP"));
        assert!(prod.force_legacy_tls);

        let sandbox = profiles.get("Sandbox").unwrap();
        assert!(sandbox.username.is_none());
        assert_eq!(sandbox.login_method, LoginMethod::Basic);

        let mut names: Vec<&str> = profiles.names().collect();
        names.sort_unstable();
        assert_eq!(names, vec!["Production", "Sandbox"]);
    }

    #[test]
    fn test_session_config_from_profile() {
        let profiles = Profiles::from_toml(PROFILES).unwrap();
        let config = profiles.get("Production").unwrap().session_config().unwrap();

        assert!(config.transport.force_legacy_tls);
        assert_eq!(config.login_method, LoginMethod::Saml);
        assert_eq!(config.base_url(), "https://acme.attask-ondemand.com/");
    }

    #[test]
    fn test_missing_profile_and_url() {
        let profiles = Profiles::from_toml("[Empty]\n").unwrap();
        assert!(matches!(profiles.get("Production"), Err(AtTaskError::Config(_))));
        assert!(profiles.get("Empty").unwrap().session_config().is_err());
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(Profiles::from_toml("[Production]\nurl = \"https://x\"\nproxy = \"y\"\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("attask.toml");
        fs::write(&path, PROFILES).unwrap();

        let profiles = Profiles::load(&path).unwrap();
        assert!(profiles.get("Sandbox").is_ok());

        assert!(Profiles::load(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_debug_redacts_password() {
        let profiles = Profiles::from_toml(PROFILES).unwrap();
        let rendered = format!("{:?}", profiles.get("Production").unwrap());
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("REDACTED"));
    }
}
