//! In-memory token store.
//!
//! The realtime transport needs a synchronously readable current bearer
//! token at connect time. [`TokenStore`] is that seam: the auth flow (an
//! external collaborator) deposits tokens here, connections read them.

use std::path::PathBuf;

use parking_lot::RwLock;

use crate::storage;

/// Holds the current bearer token, optionally backed by the auth file.
///
/// All reads and writes are synchronous; persistence failures are logged,
/// never raised — a token in memory is still usable for the handshake.
#[derive(Debug, Default)]
pub struct TokenStore {
    token: RwLock<Option<String>>,
    path: Option<PathBuf>,
}

impl TokenStore {
    /// Store without file backing (tests, ephemeral sessions).
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Store backed by the auth file at `path`, seeded from its contents.
    #[must_use]
    pub fn from_path(path: PathBuf) -> Self {
        let token = storage::load_auth_storage(&path).and_then(|s| s.token);
        Self {
            token: RwLock::new(token),
            path: Some(path),
        }
    }

    /// The current bearer token, if one is set and non-empty.
    #[must_use]
    pub fn current_token(&self) -> Option<String> {
        self.token
            .read()
            .clone()
            .filter(|t| !t.trim().is_empty())
    }

    /// Replace the current token, persisting it when file-backed.
    pub fn set_token(&self, token: impl Into<String>) {
        let token = token.into();
        if let Some(path) = &self.path {
            if let Err(e) = storage::save_token(path, &token) {
                tracing::warn!("failed to persist token: {e}");
            }
        }
        *self.token.write() = Some(token);
    }

    /// Drop the current token, clearing the file copy when file-backed.
    pub fn clear(&self) {
        if let Some(path) = &self.path {
            if let Err(e) = storage::clear_token(path) {
                tracing::warn!("failed to clear persisted token: {e}");
            }
        }
        *self.token.write() = None;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let store = TokenStore::in_memory();
        assert!(store.current_token().is_none());
    }

    #[test]
    fn set_and_read() {
        let store = TokenStore::in_memory();
        store.set_token("abc");
        assert_eq!(store.current_token().as_deref(), Some("abc"));
    }

    #[test]
    fn blank_token_reads_as_none() {
        let store = TokenStore::in_memory();
        store.set_token("   ");
        assert!(store.current_token().is_none());
    }

    #[test]
    fn clear_removes_token() {
        let store = TokenStore::in_memory();
        store.set_token("abc");
        store.clear();
        assert!(store.current_token().is_none());
    }

    #[test]
    fn file_backed_store_seeds_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = storage::auth_file_path(dir.path());

        let store = TokenStore::from_path(path.clone());
        assert!(store.current_token().is_none());
        store.set_token("tok_1");

        // A second store over the same file sees the persisted token.
        let other = TokenStore::from_path(path);
        assert_eq!(other.current_token().as_deref(), Some("tok_1"));
    }

    #[test]
    fn file_backed_clear_clears_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = storage::auth_file_path(dir.path());

        let store = TokenStore::from_path(path.clone());
        store.set_token("tok_1");
        store.clear();

        let other = TokenStore::from_path(path);
        assert!(other.current_token().is_none());
    }
}
