//! Credential store: the one piece of durable client state.
//!
//! Holds the bearer token and the user snapshot returned by login or
//! registration. Nothing here tracks expiry; a stale token shows up as a
//! 401 on the next authorized call.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::config::HueConfig;
use crate::error::{HueError, Result};
use crate::model::Session;

pub trait CredentialStore: Send + Sync {
    /// Persist the session, replacing any previous one.
    fn set(&self, session: &Session) -> Result<()>;

    /// Current session, or `None` when signed out.
    fn get(&self) -> Result<Option<Session>>;

    /// Remove token and user.
    fn clear(&self) -> Result<()>;

    /// Current bearer token, or `None` when signed out.
    fn token(&self) -> Result<Option<String>> {
        Ok(self.get()?.map(|s| s.token))
    }
}

/// JSON file with the keys `token` and `user`.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn set(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                HueError::Storage(format!("failed to create {}: {e}", parent.display()))
            })?;
        }
        let json = serde_json::to_string_pretty(session)?;
        write_private(&self.path, json.as_bytes()).map_err(|e| {
            HueError::Storage(format!("failed to write {}: {e}", self.path.display()))
        })?;
        // `mode` only applies on create; tighten a file that already existed.
        restrict_permissions(&self.path)?;
        tracing::debug!(path = %self.path.display(), user = %session.user.id, "session stored");
        Ok(())
    }

    fn get(&self) -> Result<Option<Session>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(HueError::Storage(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )))
            }
        };
        match serde_json::from_str(&contents) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "ignoring unreadable session file"
                );
                Ok(None)
            }
        }
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "session cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(HueError::Storage(format!(
                "failed to remove {}: {e}",
                self.path.display()
            ))),
        }
    }
}

/// Write `contents`, creating the file owner-only (0600 on Unix).
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(contents)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| HueError::Storage(format!("failed to set permissions: {e}")))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

/// In-process store; nothing survives the process.
#[derive(Default)]
pub struct MemoryCredentialStore {
    session: Mutex<Option<Session>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn set(&self, session: &Session) -> Result<()> {
        let mut guard = self
            .session
            .lock()
            .map_err(|e| HueError::Storage(format!("failed to acquire session lock: {e}")))?;
        *guard = Some(session.clone());
        Ok(())
    }

    fn get(&self) -> Result<Option<Session>> {
        let guard = self
            .session
            .lock()
            .map_err(|e| HueError::Storage(format!("failed to acquire session lock: {e}")))?;
        Ok(guard.clone())
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self
            .session
            .lock()
            .map_err(|e| HueError::Storage(format!("failed to acquire session lock: {e}")))?;
        *guard = None;
        Ok(())
    }
}

/// File-backed store at the configured location.
pub fn create_store(config: &HueConfig) -> Result<Arc<dyn CredentialStore>> {
    let path = config.session_path()?;
    Ok(Arc::new(FileCredentialStore::new(path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::User;

    fn carlos() -> Session {
        Session::new(
            "mock-jwt-token-1",
            User {
                id: "1".into(),
                name: "Carlos Mendoza".into(),
                email: "carlos@example.com".into(),
            },
        )
    }

    fn temp_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("huequitas-test-{}", uuid::Uuid::now_v7()))
            .join("session.json")
    }

    #[test]
    fn test_file_store_survives_reload() {
        let path = temp_path();
        let store = FileCredentialStore::new(&path);
        assert!(store.get().unwrap().is_none());

        store.set(&carlos()).unwrap();

        let reopened = FileCredentialStore::new(&path);
        assert_eq!(reopened.get().unwrap(), Some(carlos()));
        assert_eq!(reopened.token().unwrap().as_deref(), Some("mock-jwt-token-1"));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_file_store_clear_removes_file() {
        let path = temp_path();
        let store = FileCredentialStore::new(&path);
        store.set(&carlos()).unwrap();
        assert!(path.exists());

        store.clear().unwrap();
        assert!(!path.exists());
        assert!(store.get().unwrap().is_none());
        // Clearing twice is fine.
        store.clear().unwrap();

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_file_store_uses_fixed_keys() {
        let path = temp_path();
        let store = FileCredentialStore::new(&path);
        store.set(&carlos()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["token"], "mock-jwt-token-1");
        assert_eq!(raw["user"]["name"], "Carlos Mendoza");

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_corrupt_file_reads_as_signed_out() {
        let path = temp_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();

        let store = FileCredentialStore::new(&path);
        assert!(store.get().unwrap().is_none());
        assert!(store.token().unwrap().is_none());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let path = temp_path();
        let store = FileCredentialStore::new(&path);
        store.set(&carlos()).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_write_private_creates_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let path = temp_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        write_private(&path, b"{}").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_existing_readable_file_is_tightened() {
        use std::os::unix::fs::PermissionsExt;

        let path = temp_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        FileCredentialStore::new(&path).set(&carlos()).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryCredentialStore::new();
        assert!(store.token().unwrap().is_none());
        store.set(&carlos()).unwrap();
        assert_eq!(store.get().unwrap(), Some(carlos()));
        store.clear().unwrap();
        assert!(store.get().unwrap().is_none());
    }
}
