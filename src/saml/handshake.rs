//! Two-hop SAML web-browser SSO handshake.
//!
//! The service answers an unauthenticated request with an auto-submitting
//! form carrying a `SAMLRequest`. That form goes to the identity provider with
//! NTLM credentials; the provider answers with a second form carrying the
//! `SAMLResponse`, which is posted back to the service. The service then
//! identifies the user through a response header and sets its session cookie.
//!
//! Exactly one form per page and the three fields in
//! [`SAML_FIELDS`](super::form::SAML_FIELDS) are assumed. This is what the
//! AtTask deployment's identity provider emits, not general SAML handling.

use reqwest::StatusCode;
use tracing::{debug, error, info, warn};

use super::form::extract_form;
use crate::error::{AtTaskError, Result};
use crate::session::types::user_id_from;
use crate::transport::{HttpTransport, NtlmCredentials, RawResponse, TransportConfig};

/// Result of a handshake that ran to completion.
#[derive(Debug)]
pub enum HandshakeOutcome {
    /// The service identified the user. `transport` holds the new session
    /// cookie and should replace the caller's transport.
    Authenticated {
        user_id: String,
        transport: HttpTransport,
    },
    /// Every hop succeeded but the service did not identify the user.
    Rejected,
}

/// Drives the SSO exchange with fresh transports built from `config`.
pub struct SamlHandshake<'a> {
    config: &'a TransportConfig,
}

impl<'a> SamlHandshake<'a> {
    pub fn new(config: &'a TransportConfig) -> Self {
        Self { config }
    }

    /// Run the handshake starting from the service's unauthenticated response.
    ///
    /// `username` is domain-qualified (`DOMAIN\user`). On success the cookie
    /// jar of the returned transport has already been saved.
    pub fn authenticate(
        &self,
        username: &str,
        password: &str,
        initial_response: &RawResponse,
    ) -> Result<HandshakeOutcome> {
        debug!(url = %initial_response.url, "Extracting SAML request form");
        let request_form = extract_form(&initial_response.body, &initial_response.url)?;

        let credentials = NtlmCredentials::from_qualified(username, password);
        let idp = HttpTransport::new(self.config)?;
        let idp_response = idp.post_form(&request_form.action, &request_form.values, Some(&credentials))?;

        if idp_response.status != StatusCode::OK {
            error!(
                url = %idp_response.url,
                status = idp_response.status.as_u16(),
                "Identity provider rejected SAML request"
            );
            return Err(AtTaskError::Authentication(format!(
                "identity provider returned {}",
                idp_response.status
            )));
        }
        debug!(status = idp_response.status.as_u16(), "Response from SAML request");

        let response_form = extract_form(&idp_response.body, &idp_response.url)?;

        let transport = HttpTransport::new(self.config)?;
        let service_response = transport.post_form(&response_form.action, &response_form.values, None)?;

        if service_response.status != StatusCode::OK {
            error!(
                url = %service_response.url,
                status = service_response.status.as_u16(),
                "Service rejected SAML response"
            );
            return Err(AtTaskError::Authentication(format!(
                "service returned {} for SAML response",
                service_response.status
            )));
        }

        let Some(user_id) = user_id_from(&service_response) else {
            warn!(url = %service_response.url, "SAML response accepted without a user id");
            return Ok(HandshakeOutcome::Rejected);
        };

        transport.save_cookies()?;
        info!(user_id = %user_id, "SAML handshake completed");

        Ok(HandshakeOutcome::Authenticated { user_id, transport })
    }
}
