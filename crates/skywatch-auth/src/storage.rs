//! Auth storage file I/O.
//!
//! Reads and writes `~/.skywatch/auth.json` with secure file permissions
//! (0o600). The file holds the opaque bearer token the realtime handshake
//! sends; issuing and refreshing that token is the auth service's job, not
//! this client's.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::AuthError;

/// Default auth file name.
const AUTH_FILE_NAME: &str = "auth.json";

/// Persisted auth state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthStorage {
    /// Storage schema version.
    #[serde(default = "default_version")]
    pub version: u32,
    /// Current bearer token, if signed in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// RFC 3339 time of the last write.
    #[serde(default)]
    pub last_updated: String,
}

fn default_version() -> u32 {
    1
}

impl AuthStorage {
    /// Fresh storage with the current schema version and no token.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: 1,
            token: None,
            last_updated: String::new(),
        }
    }
}

impl Default for AuthStorage {
    fn default() -> Self {
        Self::new()
    }
}

/// Get the auth file path under the given data directory.
pub fn auth_file_path(data_dir: &Path) -> PathBuf {
    data_dir.join(AUTH_FILE_NAME)
}

/// Load auth storage from file (sync).
///
/// Returns `None` if the file doesn't exist or is invalid.
pub fn load_auth_storage(path: &Path) -> Option<AuthStorage> {
    let data = match std::fs::read_to_string(path) {
        Ok(d) => d,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!("failed to read auth file: {e}");
            return None;
        }
    };

    match serde_json::from_str::<AuthStorage>(&data) {
        Ok(storage) if storage.version == 1 => Some(storage),
        Ok(storage) => {
            tracing::warn!("unsupported auth storage version: {}", storage.version);
            None
        }
        Err(e) => {
            tracing::warn!("failed to parse auth file: {e}");
            None
        }
    }
}

/// Save auth storage to file (sync).
///
/// Creates parent directories if needed. Sets file permissions to 0o600.
pub fn save_auth_storage(path: &Path, storage: &mut AuthStorage) -> Result<(), AuthError> {
    storage.last_updated = chrono::Utc::now().to_rfc3339();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(storage)?;
    std::fs::write(path, &json)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        let _ = std::fs::set_permissions(path, perms);
    }

    Ok(())
}

/// Persist a bearer token, patching existing storage.
pub fn save_token(path: &Path, token: &str) -> Result<(), AuthError> {
    let mut storage = load_auth_storage(path).unwrap_or_default();
    storage.token = Some(token.to_string());
    save_auth_storage(path, &mut storage)
}

/// Remove the persisted bearer token, keeping the file.
pub fn clear_token(path: &Path) -> Result<(), AuthError> {
    let mut storage = load_auth_storage(path).unwrap_or_default();
    storage.token = None;
    save_auth_storage(path, &mut storage)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_auth_storage(&auth_file_path(dir.path())).is_none());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = auth_file_path(dir.path());
        save_token(&path, "tok_abc").unwrap();

        let storage = load_auth_storage(&path).unwrap();
        assert_eq!(storage.version, 1);
        assert_eq!(storage.token.as_deref(), Some("tok_abc"));
        assert!(!storage.last_updated.is_empty());
    }

    #[test]
    fn clear_token_keeps_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = auth_file_path(dir.path());
        save_token(&path, "tok_abc").unwrap();
        clear_token(&path).unwrap();

        let storage = load_auth_storage(&path).unwrap();
        assert!(storage.token.is_none());
    }

    #[test]
    fn invalid_json_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = auth_file_path(dir.path());
        std::fs::write(&path, "not json").unwrap();
        assert!(load_auth_storage(&path).is_none());
    }

    #[test]
    fn unsupported_version_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = auth_file_path(dir.path());
        std::fs::write(&path, r#"{"version": 2, "token": "t"}"#).unwrap();
        assert!(load_auth_storage(&path).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn file_permissions_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = auth_file_path(dir.path());
        save_token(&path, "tok_abc").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
