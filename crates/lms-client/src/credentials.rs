//! Session credential storage.
//!
//! A session is the bearer token plus the user projection returned at login,
//! stored under the keys `token` and `user`.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};
use crate::types::UserProfile;

/// A stored session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    /// Bearer token.
    pub token: String,
    /// The logged-in user.
    pub user: UserProfile,
}

/// Where the client keeps its session between calls.
pub trait CredentialStore: Send + Sync {
    /// Read the stored session, if any.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Credentials` if storage cannot be read.
    fn load(&self) -> Result<Option<Credentials>>;

    /// Replace the stored session.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Credentials` if storage cannot be written.
    fn save(&self, credentials: &Credentials) -> Result<()>;

    /// Forget the stored session. Clearing empty storage succeeds.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Credentials` if storage cannot be written.
    fn clear(&self) -> Result<()>;
}

/// Process-local storage.
#[derive(Debug, Default)]
pub struct MemoryCredentials {
    inner: RwLock<Option<Credentials>>,
}

impl MemoryCredentials {
    /// Empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentials {
    fn load(&self) -> Result<Option<Credentials>> {
        Ok(self.inner.read().clone())
    }

    fn save(&self, credentials: &Credentials) -> Result<()> {
        *self.inner.write() = Some(credentials.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.inner.write() = None;
        Ok(())
    }
}

/// A JSON file holding `{ "token": ..., "user": ... }`.
#[derive(Debug, Clone)]
pub struct FileCredentials {
    path: PathBuf,
}

impl FileCredentials {
    /// Storage at `path`. The file is created on the first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$HOME/.lms/credentials.json`, or the working directory when `HOME`
    /// is unset.
    #[must_use]
    pub fn default_path() -> PathBuf {
        std::env::var_os("HOME")
            .map_or_else(PathBuf::new, PathBuf::from)
            .join(".lms")
            .join("credentials.json")
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentials {
    fn load(&self) -> Result<Option<Credentials>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }

        match serde_json::from_str(&raw) {
            Ok(credentials) => Ok(Some(credentials)),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring unreadable credentials");
                Ok(None)
            }
        }
    }

    fn save(&self, credentials: &Credentials) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(credentials)
            .map_err(|e| ClientError::Credentials(e.to_string()))?;
        fs::write(&self.path, json)?;
        tracing::debug!(path = %self.path.display(), "Saved credentials");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lms_core::Role;
    use serde_json::Map;

    fn sample() -> Credentials {
        Credentials {
            token: "abc".into(),
            user: UserProfile {
                id: "student1".into(),
                first_name: "John".into(),
                last_name: "Doe".into(),
                email: "student@university.edu".into(),
                role: Role::Student,
                extra: Map::new(),
            },
        }
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryCredentials::new();
        assert!(store.load().unwrap().is_none());

        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap().unwrap().token, "abc");

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn file_store_writes_token_and_user_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentials::new(dir.path().join("nested").join("credentials.json"));
        assert!(store.load().unwrap().is_none());

        store.save(&sample()).unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["token"], "abc");
        assert_eq!(raw["user"]["_id"], "student1");

        assert_eq!(store.load().unwrap(), Some(sample()));

        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn corrupt_file_reads_as_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, "{not json").unwrap();

        assert!(FileCredentials::new(path).load().unwrap().is_none());
    }
}
