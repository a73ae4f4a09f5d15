//! REST dispatch for resource operations.

use reqwest::{Method, StatusCode};
use serde_json::{Map, Value};
use std::str::FromStr;
use tracing::{debug, info};

use crate::error::{AtTaskError, Result};
use crate::session::Session;
use crate::transport::Params;

/// REST verbs the API accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl RestMethod {
    fn as_method(self) -> Method {
        match self {
            RestMethod::Get => Method::GET,
            RestMethod::Post => Method::POST,
            RestMethod::Put => Method::PUT,
            RestMethod::Delete => Method::DELETE,
        }
    }
}

impl FromStr for RestMethod {
    type Err = AtTaskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(RestMethod::Get),
            "post" => Ok(RestMethod::Post),
            "put" => Ok(RestMethod::Put),
            "delete" => Ok(RestMethod::Delete),
            _ => Err(AtTaskError::UnsupportedMethod(s.to_string())),
        }
    }
}

impl std::fmt::Display for RestMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_method())
    }
}

/// Perform one REST call and validate the envelope.
///
/// 200 and 302 are accepted; any other status is an HTTP error. A body with
/// an `error` key is an API error regardless of `data`; a body with neither
/// is a shape error. On success the whole JSON object is returned and the
/// caller extracts `data`.
pub fn rest_transaction(
    session: &Session,
    method: &str,
    url: &str,
    params: &Params,
) -> Result<Map<String, Value>> {
    let method = RestMethod::from_str(method)?.as_method();

    let transport = session.transport()?;
    let response = transport.request(method.clone(), url, params)?;
    info!(method = %method, url = %response.url, status = response.status.as_u16(), "REST request returned");

    if response.status != StatusCode::OK && response.status != StatusCode::FOUND {
        return Err(response.to_http_error(&method));
    }

    let body = response.json()?;
    debug!(body = %body, "REST response");

    check_envelope(body)
}

/// Validate a decoded response body.
pub(crate) fn check_envelope(body: Value) -> Result<Map<String, Value>> {
    let mut map = match body {
        Value::Object(map) => map,
        other => return Err(AtTaskError::ApiShape(other)),
    };

    if let Some(error) = map.remove("error") {
        return Err(AtTaskError::Api(error));
    }
    if !map.contains_key("data") {
        return Err(AtTaskError::ApiShape(Value::Object(map)));
    }

    Ok(map)
}
