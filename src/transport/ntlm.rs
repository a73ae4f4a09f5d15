//! NTLM authentication for a single form POST.
//!
//! Mirrors what a browser does against a Windows-integrated identity
//! provider: send the request plainly, and only if the server answers 401
//! offering NTLM run negotiate → challenge → authenticate on the same client
//! so the pooled connection carries the handshake.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, AUTHORIZATION, WWW_AUTHENTICATE};
use reqwest::StatusCode;
use tracing::debug;

use crate::error::{AtTaskError, Result};

/// NTLM credentials split out of a `DOMAIN\user` login name.
#[derive(Clone)]
pub struct NtlmCredentials {
    pub domain: String,
    pub username: String,
    password: String,
}

impl NtlmCredentials {
    pub fn new(domain: impl Into<String>, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Build from a domain-qualified name (`DOMAIN\user`). A bare name gets an
    /// empty domain.
    pub fn from_qualified(qualified: &str, password: &str) -> Self {
        match qualified.split_once('\\') {
            Some((domain, user)) => Self::new(domain, user, password),
            None => Self::new("", qualified, password),
        }
    }

    fn to_ntlm(&self) -> ntlmclient::Credentials {
        ntlmclient::Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
            domain: self.domain.clone(),
        }
    }
}

impl std::fmt::Debug for NtlmCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NtlmCredentials")
            .field("domain", &self.domain)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// POST `form` to `url`, answering an NTLM challenge if the server issues one.
pub(crate) fn post_form(
    client: &Client,
    url: &str,
    form: &[(String, String)],
    credentials: &NtlmCredentials,
) -> Result<Response> {
    let response = client.post(url).form(form).send()?;
    if response.status() != StatusCode::UNAUTHORIZED || !offers_ntlm(response.headers()) {
        return Ok(response);
    }
    // Drain so the connection goes back to the pool for the next leg.
    let _ = response.bytes();

    let workstation = workstation_name();
    debug!(url = %url, workstation = %workstation, "Sending NTLM negotiate");
    let negotiate = negotiate_message(&workstation)?;
    let response = client
        .post(url)
        .header(AUTHORIZATION, format!("NTLM {}", negotiate))
        .form(form)
        .send()?;
    if response.status() != StatusCode::UNAUTHORIZED {
        return Ok(response);
    }

    let challenge = challenge_bytes(response.headers())?;
    let _ = response.bytes();

    debug!(url = %url, user = %credentials.username, "Answering NTLM challenge");
    let authenticate = authenticate_message(&challenge, credentials, &workstation)?;
    let response = client
        .post(url)
        .header(AUTHORIZATION, format!("NTLM {}", authenticate))
        .form(form)
        .send()?;

    Ok(response)
}

/// Whether any `WWW-Authenticate` header offers NTLM.
pub(crate) fn offers_ntlm(headers: &HeaderMap) -> bool {
    headers
        .get_all(WWW_AUTHENTICATE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.trim().to_ascii_uppercase().starts_with("NTLM"))
}

fn challenge_bytes(headers: &HeaderMap) -> Result<Vec<u8>> {
    let token = headers
        .get_all(WWW_AUTHENTICATE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| {
            let (scheme, token) = v.trim().split_once(' ')?;
            scheme.eq_ignore_ascii_case("NTLM").then(|| token.trim().to_string())
        })
        .next()
        .ok_or_else(|| AtTaskError::Authentication("NTLM challenge missing".to_string()))?;

    BASE64
        .decode(token)
        .map_err(|e| AtTaskError::Authentication(format!("NTLM challenge is not base64: {}", e)))
}

pub(crate) fn negotiate_message(workstation: &str) -> Result<String> {
    let flags = ntlmclient::Flags::NEGOTIATE_UNICODE
        | ntlmclient::Flags::REQUEST_TARGET
        | ntlmclient::Flags::NEGOTIATE_NTLM
        | ntlmclient::Flags::NEGOTIATE_WORKSTATION_SUPPLIED;
    let message = ntlmclient::Message::Negotiate(ntlmclient::NegotiateMessage {
        flags,
        supplied_domain: String::new(),
        supplied_workstation: workstation.to_owned(),
        os_version: Default::default(),
    });
    let bytes = message
        .to_bytes()
        .map_err(|e| AtTaskError::Authentication(format!("NTLM negotiate encoding failed: {:?}", e)))?;

    Ok(BASE64.encode(bytes))
}

fn authenticate_message(
    challenge: &[u8],
    credentials: &NtlmCredentials,
    workstation: &str,
) -> Result<String> {
    let message = ntlmclient::Message::try_from(challenge)
        .map_err(|e| AtTaskError::Authentication(format!("NTLM challenge decoding failed: {:?}", e)))?;
    let challenge = match message {
        ntlmclient::Message::Challenge(c) => c,
        other => {
            return Err(AtTaskError::Authentication(format!(
                "unexpected NTLM message: {:?}",
                other
            )))
        }
    };

    let target_info: Vec<u8> = challenge
        .target_information
        .iter()
        .flat_map(|entry| entry.to_bytes())
        .collect();

    let creds = credentials.to_ntlm();
    let response = ntlmclient::respond_challenge_ntlm_v2(
        challenge.challenge,
        &target_info,
        ntlmclient::get_ntlm_time(),
        &creds,
    );

    let flags = ntlmclient::Flags::NEGOTIATE_UNICODE | ntlmclient::Flags::NEGOTIATE_NTLM;
    let bytes = response
        .to_message(&creds, workstation, flags)
        .to_bytes()
        .map_err(|e| AtTaskError::Authentication(format!("NTLM authenticate encoding failed: {:?}", e)))?;

    Ok(BASE64.encode(bytes))
}

fn workstation_name() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "WORKSTATION".to_string())
}
