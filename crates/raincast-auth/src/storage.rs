use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::SessionError;

/// Minimal identity of the signed-in principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub fullname: String,
}

/// Session credential plus principal, as persisted on disk.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Opaque bearer token
    pub token: String,
    pub principal: Principal,
}

impl Credential {
    pub fn new(token: impl Into<String>, principal: Principal) -> Self {
        Self {
            token: token.into(),
            principal,
        }
    }
}

// Tokens never reach logs.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("principal", &self.principal)
            .finish()
    }
}

/// File-backed storage for the session credential.
/// The credential lives as JSON in the user's config directory.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config_dir>/raincast/session.json`
    pub fn default_path() -> Result<PathBuf, SessionError> {
        let dir = dirs::config_dir().ok_or(SessionError::NoConfigDir)?;
        Ok(dir.join("raincast").join("session.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored credential. `Ok(None)` when nothing is stored.
    pub fn load(&self) -> Result<Option<Credential>, SessionError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let credential: Credential = serde_json::from_str(&json)?;
        tracing::debug!("Loaded credential for principal {}", credential.principal.id);
        Ok(Some(credential))
    }

    pub fn store(&self, credential: &Credential) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(credential)?;
        fs::write(&self.path, json)?;

        tracing::info!("Stored credential at {:?}", self.path);
        Ok(())
    }

    /// Remove the stored credential. Removing an absent credential is a no-op.
    pub fn invalidate(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!("Removed credential at {:?}", self.path);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn credential() -> Credential {
        Credential::new(
            "secret-token",
            Principal {
                id: "42".into(),
                email: "user@example.com".into(),
                fullname: "Test User".into(),
            },
        )
    }

    #[test]
    fn test_store_and_load() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path().join("nested").join("session.json"));

        assert_eq!(store.load().unwrap(), None);
        store.store(&credential()).unwrap();
        assert_eq!(store.load().unwrap(), Some(credential()));
    }

    #[test]
    fn test_invalidate_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path().join("session.json"));

        store.store(&credential()).unwrap();
        store.invalidate().unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.invalidate().unwrap();
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();

        let result = CredentialStore::new(path).load();
        assert!(matches!(result, Err(SessionError::Corrupt(_))));
    }

    #[test]
    fn test_principal_fields_optional() {
        let c: Credential =
            serde_json::from_str(r#"{"token": "t", "principal": {"id": "1"}}"#).unwrap();
        assert_eq!(c.principal.email, "");
    }

    #[test]
    fn test_debug_redacts_token() {
        let shown = format!("{:?}", credential());
        assert!(!shown.contains("secret-token"));
        assert!(shown.contains("user@example.com"));
    }
}
