//! SAML single sign-on against the AtTask identity provider.
//!
//! Forms are scraped from HTML and re-posted; no SAML XML is parsed here.

pub mod form;
pub mod handshake;

pub use form::{extract_form, SamlForm, SAML_FIELDS};
pub use handshake::{HandshakeOutcome, SamlHandshake};
