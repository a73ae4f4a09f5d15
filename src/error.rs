//! Error types for the AtTask client.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `AtTaskError`.
pub type Result<T> = std::result::Result<T, AtTaskError>;

/// Errors raised by session, transport and resource operations.
#[derive(Debug, Error)]
pub enum AtTaskError {
    /// An operation needing a session ran before one was created.
    #[error("Session uninitialized")]
    NoSession,

    /// SAML handshake failure or an operation run without authentication.
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// A request returned a status outside the accepted set.
    #[error("{method} {url} returned error {status}: {reason}")]
    Http {
        method: String,
        url: String,
        status: u16,
        reason: String,
    },

    /// The API reported an error; carries the server payload verbatim.
    #[error("API returned error: {0}")]
    Api(serde_json::Value),

    /// The API response carried neither `data` nor `error`.
    #[error("data or error not in json response: {0}")]
    ApiShape(serde_json::Value),

    /// A REST verb outside get/post/put/delete.
    #[error("Unsupported REST method: {0}")]
    UnsupportedMethod(String),

    /// A declared code path with no implementation.
    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),

    /// A field name the resource kind does not recognize.
    #[error("Field '{field}' is not recognized for {obj_code}")]
    UnknownField { obj_code: &'static str, field: String },

    /// Configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Cookie jar could not be read or written.
    #[error("Cookie jar {path:?}: {message}")]
    CookieJar { path: PathBuf, message: String },

    #[error("Session lock poisoned")]
    LockPoisoned,

    /// Transport failure (connection, TLS, body decoding).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl AtTaskError {
    /// Whether this is the authentication failure kind.
    pub fn is_authentication(&self) -> bool {
        matches!(self, AtTaskError::Authentication(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_http_error_message() {
        let err = AtTaskError::Http {
            method: "GET".to_string(),
            url: "https://example.com/attask/api/task/search".to_string(),
            status: 500,
            reason: "Internal Server Error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "GET https://example.com/attask/api/task/search returned error 500: Internal Server Error"
        );
    }

    #[test]
    fn test_api_error_carries_payload() {
        let payload = json!({"message": "APIModel V4_0 does not support field foo"});
        let err = AtTaskError::Api(payload.clone());
        match err {
            AtTaskError::Api(value) => assert_eq!(value, payload),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_is_authentication() {
        assert!(AtTaskError::Authentication("no saml form in response".into()).is_authentication());
        assert!(!AtTaskError::NoSession.is_authentication());
    }
}
