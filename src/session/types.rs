//! Session state types.

use serde::{Deserialize, Serialize};

use crate::transport::RawResponse;

/// Response header through which the service names the authenticated user.
pub const USER_ID_HEADER: &str = "userid";

/// Authentication state of a session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    /// No valid cookie, or not yet probed.
    #[default]
    Unauthenticated,
    /// Cookie accepted by the service for this user.
    Authenticated { user_id: String },
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated { .. })
    }

    pub fn user_id(&self) -> Option<&str> {
        match self {
            AuthState::Authenticated { user_id } => Some(user_id),
            AuthState::Unauthenticated => None,
        }
    }
}

impl std::fmt::Display for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthState::Authenticated { .. } => write!(f, "Authenticated"),
            AuthState::Unauthenticated => write!(f, "NOT Authenticated"),
        }
    }
}

/// How `login` obtains the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginMethod {
    /// SAML SSO through an NTLM-protected identity provider.
    #[default]
    Saml,
    /// HTTP basic authentication (declared, not implemented).
    Basic,
}

impl std::fmt::Display for LoginMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoginMethod::Saml => write!(f, "saml"),
            LoginMethod::Basic => write!(f, "basic"),
        }
    }
}

/// User id announced by the service in a response, if any.
pub fn user_id_from(response: &RawResponse) -> Option<String> {
    response
        .header(USER_ID_HEADER)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
