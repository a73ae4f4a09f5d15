//! Session management for the AtTask API.
//!
//! A session owns the HTTP transport and tracks whether its cookie is
//! accepted by the service. Cookies persist across runs through the
//! transport's cookie jar; the probe decides whether they are still valid
//! before any handshake is attempted.

pub mod config;
pub mod state;
pub mod types;

pub use config::{SessionConfig, AUTH_PROBE_ENDPOINT};
pub use state::Session;
pub use types::{AuthState, LoginMethod, USER_ID_HEADER};
