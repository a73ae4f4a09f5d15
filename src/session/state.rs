//! Authenticated session against an AtTask instance.

use reqwest::{Method, StatusCode};
use std::sync::RwLock;
use tracing::{debug, info, warn};

use super::config::SessionConfig;
use super::types::{user_id_from, AuthState, LoginMethod};
use crate::error::{AtTaskError, Result};
use crate::saml::{HandshakeOutcome, SamlHandshake};
use crate::transport::HttpTransport;

/// A session: the transport carrying the service cookie and the
/// authentication state derived from it.
pub struct Session {
    config: SessionConfig,
    url: String,
    base_url: String,
    transport: RwLock<HttpTransport>,
    state: RwLock<AuthState>,
}

impl Session {
    /// Create an unauthenticated session. Cookies persisted by an earlier run
    /// are loaded but not trusted until probed.
    pub fn new(config: SessionConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(&config.transport)?;

        let session = Self {
            url: config.api_url(),
            base_url: config.base_url(),
            transport: RwLock::new(transport),
            state: RwLock::new(AuthState::Unauthenticated),
            config,
        };
        debug!(url = %session.url, "Session created");

        Ok(session)
    }

    /// Versioned API URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Site root the login handshake starts from.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Last known authentication state, without contacting the server.
    pub fn state(&self) -> Result<AuthState> {
        self.state
            .read()
            .map(|s| s.clone())
            .map_err(|_| AtTaskError::LockPoisoned)
    }

    /// User id cached by the last successful probe or handshake.
    pub fn user_id(&self) -> Option<String> {
        self.state
            .read()
            .ok()
            .and_then(|s| s.user_id().map(str::to_string))
    }

    /// Handle to the current transport.
    pub fn transport(&self) -> Result<HttpTransport> {
        self.transport
            .read()
            .map(|t| t.clone())
            .map_err(|_| AtTaskError::LockPoisoned)
    }

    fn set_state(&self, state: AuthState) -> Result<()> {
        let mut current = self.state.write().map_err(|_| AtTaskError::LockPoisoned)?;
        *current = state;
        Ok(())
    }

    /// Probe the service to see whether the current cookie is accepted.
    ///
    /// 401 and a 200 lacking the user id header are ordinary negative
    /// answers. Any other status is an error.
    pub fn is_authenticated(&self) -> Result<bool> {
        let transport = self.transport()?;
        let response = transport.get(&self.config.probe_url())?;

        if response.status == StatusCode::UNAUTHORIZED {
            debug!(url = %response.url, "Probe returned 401");
            self.set_state(AuthState::Unauthenticated)?;
            return Ok(false);
        }
        if response.status != StatusCode::OK {
            return Err(response.to_http_error(&Method::GET));
        }

        match user_id_from(&response) {
            Some(user_id) => {
                info!(user_id = %user_id, "Authenticated");
                self.set_state(AuthState::Authenticated { user_id })?;
                Ok(true)
            }
            None => {
                debug!(url = %response.url, "Not authenticated: no user id header");
                self.set_state(AuthState::Unauthenticated)?;
                Ok(false)
            }
        }
    }

    /// Fail with an authentication error unless the probe succeeds.
    pub fn require_authenticated(&self, operation: &str) -> Result<()> {
        if self.is_authenticated()? {
            Ok(())
        } else {
            Err(AtTaskError::Authentication(format!(
                "{} requires an authenticated session",
                operation
            )))
        }
    }

    /// Log in unless the current cookie is still accepted.
    ///
    /// Returns `Ok(false)` when the handshake ran but the service did not
    /// identify the user. Handshake failures (missing forms, rejected hops)
    /// are returned as errors.
    pub fn login(&self, username: &str, password: &str, domain: Option<&str>) -> Result<bool> {
        if self.is_authenticated()? {
            return Ok(true);
        }

        match self.config.login_method {
            LoginMethod::Saml => self.login_saml(&qualified_username(username, domain), password),
            LoginMethod::Basic => self.login_basic(username, password),
        }
    }

    fn login_saml(&self, username: &str, password: &str) -> Result<bool> {
        let transport = self.transport()?;
        debug!(url = %self.base_url, "Requesting SAML referral");
        let referral = transport.get(&self.base_url)?;
        debug!(status = referral.status.as_u16(), url = %referral.url, "Auth request");

        match SamlHandshake::new(&self.config.transport).authenticate(username, password, &referral)? {
            HandshakeOutcome::Authenticated { user_id, transport } => {
                {
                    let mut current = self.transport.write().map_err(|_| AtTaskError::LockPoisoned)?;
                    *current = transport;
                }
                self.set_state(AuthState::Authenticated { user_id })?;
                Ok(true)
            }
            HandshakeOutcome::Rejected => {
                warn!(user = %username, "SAML login did not authenticate");
                Ok(false)
            }
        }
    }

    fn login_basic(&self, _username: &str, _password: &str) -> Result<bool> {
        Err(AtTaskError::NotImplemented("basic auth"))
    }
}

impl std::fmt::Display for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state().unwrap_or_default();
        write!(f, "<AtTaskSession ({}, url=\"{}\")>", state, self.url)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("url", &self.url)
            .field("base_url", &self.base_url)
            .field("state", &self.state().unwrap_or_default())
            .finish()
    }
}

/// `DOMAIN\user` when a domain is given.
fn qualified_username(username: &str, domain: Option<&str>) -> String {
    match domain.filter(|d| !d.is_empty()) {
        Some(domain) => format!("{}\\{}", domain, username),
        None => username.to_string(),
    }
}
