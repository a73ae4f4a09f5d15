//! Explicit session holder.
//!
//! A `Client` starts without a session. Every resource accessor goes through
//! [`Client::session`], so operations attempted before `create_session` fail
//! with [`AtTaskError::NoSession`].

use tracing::info;

use crate::error::{AtTaskError, Result};
use crate::resource::{ResourceDescriptor, ResourceObject, Resources, ISSUE, PROJECT, TASK, USER};
use crate::session::{Session, SessionConfig};
use crate::transport::Params;

/// Holds the current session, if any.
#[derive(Debug, Default)]
pub struct Client {
    session: Option<Session>,
}

impl Client {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session and make it current, replacing any previous one.
    pub fn create_session(&mut self, config: SessionConfig) -> Result<&Session> {
        let session = Session::new(config)?;
        info!(url = %session.url(), "Session installed");
        Ok(&*self.session.insert(session))
    }

    /// The current session.
    pub fn session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or(AtTaskError::NoSession)
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Operations on `descriptor`'s kind through the current session.
    pub fn resources(&self, descriptor: &'static ResourceDescriptor) -> Result<Resources<'_>> {
        Ok(Resources::new(self.session()?, descriptor))
    }

    pub fn tasks(&self) -> Result<Resources<'_>> {
        self.resources(&TASK)
    }

    pub fn projects(&self) -> Result<Resources<'_>> {
        self.resources(&PROJECT)
    }

    pub fn users(&self) -> Result<Resources<'_>> {
        self.resources(&USER)
    }

    pub fn issues(&self) -> Result<Resources<'_>> {
        self.resources(&ISSUE)
    }

    /// Fetch the authenticated user with every recognized field.
    pub fn current_user(&self) -> Result<ResourceObject> {
        let session = self.session()?;
        session.require_authenticated("current_user")?;

        let user_id = session.user_id().ok_or_else(|| {
            AtTaskError::Authentication("no user id cached for session".to_string())
        })?;
        Resources::new(session, &USER).get(&user_id, true, &Params::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::state::tests::{mock_handshake, mock_probe, probe_path, test_config, API_PATH};
    use mockito::{Matcher, Server};
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_operations_without_session() {
        let client = Client::new();
        assert!(!client.has_session());

        assert!(matches!(client.session(), Err(AtTaskError::NoSession)));
        assert!(matches!(client.tasks(), Err(AtTaskError::NoSession)));
        assert!(matches!(client.current_user(), Err(AtTaskError::NoSession)));
        assert!(matches!(
            client
                .projects()
                .and_then(|p| p.get("1", false, &Params::new())),
            Err(AtTaskError::NoSession)
        ));
        assert!(matches!(
            client
                .issues()
                .and_then(|i| i.search(&Params::new(), &Params::new())),
            Err(AtTaskError::NoSession)
        ));
    }

    #[test]
    fn test_create_session_rejects_invalid_url() {
        let mut client = Client::new();
        let err = client.create_session(SessionConfig::new("ftp://example.com/attask/api")).unwrap_err();
        assert!(matches!(err, AtTaskError::Config(_)));
        assert!(!client.has_session());
    }

    #[test]
    fn test_unauthenticated_search_is_authentication_error() {
        let mut server = Server::new();
        let _probe = server.mock("GET", probe_path()).with_status(401).create();
        let dir = tempdir().unwrap();

        let mut client = Client::new();
        client.create_session(test_config(&server, dir.path())).unwrap();

        let err = client
            .tasks()
            .and_then(|t| t.search(&Params::new(), &Params::new()))
            .unwrap_err();
        assert!(err.is_authentication());

        assert!(client.current_user().unwrap_err().is_authentication());
    }

    #[test]
    fn test_current_user_after_login() {
        let mut server = Server::new();
        let _probe = mock_probe(&mut server);
        let _handshake = mock_handshake(&mut server);
        let user = server
            .mock("GET", Matcher::Regex(format!("^{}/user/4f1d3a2b", API_PATH)))
            .match_query(Matcher::UrlEncoded("fields".into(), USER.field_list()))
            .with_status(200)
            .with_body(
                json!({"data": {
                    "objCode": "USER",
                    "ID": "4f1d3a2b",
                    "name": "Jane Doe",
                    "username": "jdoe",
                    "emailAddr": "jdoe@example.com",
                }})
                .to_string(),
            )
            .expect(1)
            .create();
        let dir = tempdir().unwrap();

        let mut client = Client::new();
        let session = client.create_session(test_config(&server, dir.path())).unwrap();
        assert!(session.login("jdoe", "secret", Some("CORP")).unwrap());

        let me = client.current_user().unwrap();
        user.assert();
        assert_eq!(me.to_string(), "<User: \"Jane Doe\">");
        assert_eq!(me.get_str("username"), Some("jdoe"));
        assert!(!me.contains("emailaddr"));
    }

    #[test]
    fn test_create_session_replaces_previous() {
        let server = Server::new();
        let dir = tempdir().unwrap();

        let mut client = Client::new();
        client.create_session(test_config(&server, dir.path())).unwrap();

        let mut other = test_config(&server, dir.path());
        other.url = format!("{}/attask/api/v5.0", server.url());
        client.create_session(other).unwrap();

        assert!(client.session().unwrap().url().ends_with("/attask/api/v5.0"));
    }
}
