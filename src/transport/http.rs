//! Blocking HTTP transport with a persistent cookie jar.

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Method, StatusCode};
use tracing::debug;

use super::config::TransportConfig;
use super::cookies::CookieJar;
use super::ntlm::{self, NtlmCredentials};
use crate::error::{AtTaskError, Result};

/// Request parameters, in insertion order.
pub type Params = indexmap::IndexMap<String, String>;

/// A fully read HTTP response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// Final URL after redirects.
    pub url: String,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl RawResponse {
    fn read(response: Response) -> Result<Self> {
        let url = response.url().to_string();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text()?;
        Ok(Self {
            url,
            status,
            headers,
            body,
        })
    }

    /// Canonical reason phrase for the status.
    pub fn reason(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("Unknown")
    }

    /// Header value as a string (header names are case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Build the HTTP error for this response.
    pub fn to_http_error(&self, method: &Method) -> AtTaskError {
        AtTaskError::Http {
            method: method.to_string(),
            url: self.url.clone(),
            status: self.status.as_u16(),
            reason: self.reason().to_string(),
        }
    }
}

/// HTTP transport: a configured blocking client plus its cookie jar.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    cookies: CookieJar,
}

impl HttpTransport {
    /// Build a transport, loading cookies from the configured jar.
    pub fn new(config: &TransportConfig) -> Result<Self> {
        config.validate()?;
        let cookies = CookieJar::load(config.cookie_path()?)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .cookie_provider(cookies.provider())
            .danger_accept_invalid_certs(!config.verify_tls);

        if config.force_legacy_tls {
            builder = builder
                .min_tls_version(reqwest::tls::Version::TLS_1_0)
                .max_tls_version(reqwest::tls::Version::TLS_1_0);
        }

        let client = builder.build()?;

        debug!(
            cookie_jar = ?cookies.path(),
            cookies = cookies.len(),
            legacy_tls = config.force_legacy_tls,
            "HTTP transport ready"
        );

        Ok(Self { client, cookies })
    }

    /// Issue a request. GET and DELETE carry `params` in the query string;
    /// POST and PUT send them as a form body.
    pub fn request(&self, method: Method, url: &str, params: &Params) -> Result<RawResponse> {
        let pairs: Vec<(&str, &str)> = params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        let builder = self.client.request(method.clone(), url);
        let builder = if method == Method::POST || method == Method::PUT {
            builder.form(&pairs)
        } else {
            builder.query(&pairs)
        };

        let response = RawResponse::read(builder.send()?)?;
        debug!(method = %method, url = %response.url, status = response.status.as_u16(), "HTTP request completed");
        Ok(response)
    }

    /// GET without parameters.
    pub fn get(&self, url: &str) -> Result<RawResponse> {
        self.request(Method::GET, url, &Params::new())
    }

    /// POST a form, optionally authenticating the request with NTLM.
    pub fn post_form(
        &self,
        url: &str,
        form: &Params,
        credentials: Option<&NtlmCredentials>,
    ) -> Result<RawResponse> {
        match credentials {
            Some(credentials) => {
                let pairs: Vec<(String, String)> =
                    form.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
                RawResponse::read(ntlm::post_form(&self.client, url, &pairs, credentials)?)
            }
            None => self.request(Method::POST, url, form),
        }
    }

    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    /// Persist the cookie jar.
    pub fn save_cookies(&self) -> Result<()> {
        self.cookies.save()
    }
}
