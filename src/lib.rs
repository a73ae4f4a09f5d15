//! AtTask API client.
//!
//! Logs in to an AtTask instance through its SAML single sign-on (with an
//! NTLM-protected identity provider), keeps the resulting session cookie in a
//! jar persisted between runs, and exposes Task, Project, User and Issue
//! objects through one generic search/get protocol.
//!
//! ```no_run
//! use attask::{Client, Params, SessionConfig};
//!
//! # fn main() -> attask::Result<()> {
//! let mut client = Client::new();
//! let session = client.create_session(
//!     SessionConfig::new("https://acme.attask-ondemand.com/attask/api/v4.0").with_legacy_tls(true),
//! )?;
//! if !session.is_authenticated()? {
//!     session.login("jdoe", "hunter2", Some("CORP"))?;
//! }
//!
//! let mut search = Params::new();
//! search.insert("status".to_string(), "INP".to_string());
//! for task in client.tasks()?.search(&search, &Params::new())? {
//!     println!("{}", task);
//! }
//! println!("{}", client.current_user()?);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod profile;
pub mod resource;
pub mod saml;
pub mod session;
pub mod transport;

pub use client::Client;
pub use error::{AtTaskError, Result};
pub use profile::{Profile, Profiles, DEFAULT_PROFILE};
pub use resource::{ResourceDescriptor, ResourceObject, Resources, ISSUE, PROJECT, TASK, USER};
pub use session::{AuthState, LoginMethod, Session, SessionConfig};
pub use transport::{Params, TransportConfig};
