//! # skywatch-auth
//!
//! Bearer-token storage for the Skywatch client.
//!
//! Token issuance and refresh happen elsewhere (the REST auth endpoints);
//! this crate only persists the opaque token and exposes it synchronously to
//! the realtime transport via [`TokenStore`].
//!
//! Auth state is persisted to `~/.skywatch/auth.json` with secure file
//! permissions.

#![deny(unsafe_code)]

pub mod errors;
pub mod storage;
pub mod token;

pub use errors::AuthError;
pub use storage::{AuthStorage, auth_file_path, load_auth_storage, save_auth_storage};
pub use token::TokenStore;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn re_exports_work() {
        let _storage = AuthStorage::new();
        let _store = TokenStore::in_memory();
    }
}
