//! HTTP transport for the AtTask API.
//!
//! A blocking reqwest client with fixed headers, an optional TLS 1.0 pin and a
//! cookie jar persisted between process runs.

pub mod config;
pub mod cookies;
pub mod http;
pub mod ntlm;

pub use config::{TransportConfig, DEFAULT_COOKIE_FILE_NAME};
pub use cookies::CookieJar;
pub use http::{HttpTransport, Params, RawResponse};
pub use ntlm::NtlmCredentials;
