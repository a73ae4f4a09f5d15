//! Persistent cookie jar shared with the HTTP client.
//!
//! The jar is loaded once when a transport is built and written back only
//! when the caller asks for it (after a completed SAML handshake).

use cookie_store::CookieStore;
use reqwest_cookie_store::CookieStoreMutex;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::error::{AtTaskError, Result};

/// Cookie store bound to a file on disk.
#[derive(Clone)]
pub struct CookieJar {
    path: PathBuf,
    store: Arc<CookieStoreMutex>,
}

impl std::fmt::Debug for CookieJar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieJar")
            .field("path", &self.path)
            .field("cookies", &self.len())
            .finish()
    }
}

impl CookieJar {
    /// Load the jar from `path`. A missing file yields an empty jar; any other
    /// read or parse failure is returned.
    pub fn load(path: PathBuf) -> Result<Self> {
        let store = match File::open(&path) {
            Ok(file) => cookie_store::serde::json::load(BufReader::new(file))
                .map_err(|e| jar_error(&path, e.to_string()))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = ?path, "Cookie jar not found, starting empty");
                CookieStore::default()
            }
            Err(e) => return Err(jar_error(&path, e.to_string())),
        };

        Ok(Self {
            path,
            store: Arc::new(CookieStoreMutex::new(store)),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Handle to hand to the HTTP client as its cookie provider.
    pub fn provider(&self) -> Arc<CookieStoreMutex> {
        Arc::clone(&self.store)
    }

    /// Number of unexpired cookies currently held.
    pub fn len(&self) -> usize {
        self.store
            .lock()
            .map(|store| store.iter_unexpired().count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether an unexpired cookie with this name is held.
    pub fn contains_name(&self, name: &str) -> bool {
        self.store
            .lock()
            .map(|store| store.iter_unexpired().any(|c| c.name() == name))
            .unwrap_or(false)
    }

    /// Write persistent, unexpired cookies back to disk.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| jar_error(&self.path, e.to_string()))?;
            }
        }

        let store = self.store.lock().map_err(|_| AtTaskError::LockPoisoned)?;
        let file = File::create(&self.path).map_err(|e| jar_error(&self.path, e.to_string()))?;
        let mut writer = BufWriter::new(file);

        cookie_store::serde::json::save(&store, &mut writer)
            .map_err(|e| jar_error(&self.path, e.to_string()))?;
        writer
            .flush()
            .map_err(|e| jar_error(&self.path, e.to_string()))?;

        debug!(path = ?self.path, cookies = store.iter_unexpired().count(), "Cookie jar saved");
        Ok(())
    }
}

fn jar_error(path: &Path, message: String) -> AtTaskError {
    AtTaskError::CookieJar {
        path: path.to_path_buf(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_empty_jar() {
        let dir = tempdir().unwrap();
        let jar = CookieJar::load(dir.path().join("absent.json")).unwrap();
        assert!(jar.is_empty());
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("jar.json");
        fs::write(&path, "{ not json").unwrap();

        let result = CookieJar::load(path);
        assert!(matches!(result, Err(AtTaskError::CookieJar { .. })));
    }

    #[test]
    fn test_directory_path_is_error() {
        let dir = tempdir().unwrap();
        // Opening a directory as the jar file is not a "missing file".
        let result = CookieJar::load(dir.path().to_path_buf()).and_then(|jar| jar.save());
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("jar.json");
        let jar = CookieJar::load(path.clone()).unwrap();

        let url = url::Url::parse("https://example.attask-ondemand.com/").unwrap();
        jar.provider()
            .lock()
            .unwrap()
            .parse("attask_session=abc123; Max-Age=3600; Path=/", &url)
            .unwrap();
        jar.save().unwrap();

        let reloaded = CookieJar::load(path).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert!(reloaded.contains_name("attask_session"));
    }

    #[test]
    fn test_session_cookies_not_persisted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("jar.json");
        let jar = CookieJar::load(path.clone()).unwrap();

        let url = url::Url::parse("https://example.attask-ondemand.com/").unwrap();
        jar.provider()
            .lock()
            .unwrap()
            .parse("transient=1; Path=/", &url)
            .unwrap();
        assert!(jar.contains_name("transient"));
        jar.save().unwrap();

        let reloaded = CookieJar::load(path).unwrap();
        assert!(reloaded.is_empty());
    }
}
