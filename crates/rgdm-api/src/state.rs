//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers via
//! the `State` extractor. Cloning is cheap: everything is behind `Arc` or is
//! itself a handle.

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rgdm_verifier::DynVerifier;
use sha2::{Digest, Sha512};

use crate::config::AppConfig;
use crate::store::{KeySpace, KvStore, MemoryStore};

/// Handler state.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Arc<AppConfig>,
    /// Backing key-value store.
    pub store: Arc<dyn KvStore>,
    /// Presentation verifier. `None` when the verifier configuration is
    /// missing or invalid; every verification then fails.
    pub verifier: Option<Arc<DynVerifier>>,
    /// Key layout under the configured prefix.
    pub keys: KeySpace,
    cookie_key: Key,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn KvStore>,
        verifier: Option<Arc<DynVerifier>>,
    ) -> Self {
        let cookie_key = derive_cookie_key(config.session_secret.as_bytes());
        Self {
            keys: KeySpace::new(config.key_prefix.clone()),
            config: Arc::new(config),
            store,
            verifier,
            cookie_key,
        }
    }

    /// In-memory state with no verifier, for tests.
    pub fn in_memory(config: AppConfig) -> Self {
        Self::new(config, Arc::new(MemoryStore::new()), None)
    }

    /// Attach a verifier.
    pub fn with_verifier(mut self, verifier: DynVerifier) -> Self {
        self.verifier = Some(Arc::new(verifier));
        self
    }

    /// Key the session cookie is signed with.
    pub fn cookie_key(&self) -> &Key {
        &self.cookie_key
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Stretch the configured secret to the 64 bytes a signing [`Key`] needs.
fn derive_cookie_key(secret: &[u8]) -> Key {
    let digest = Sha512::digest(secret);
    Key::from(digest.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_key_is_stable_per_secret() {
        let a = AppState::in_memory(AppConfig::with_secret("one"));
        let b = AppState::in_memory(AppConfig::with_secret("one"));
        let c = AppState::in_memory(AppConfig::with_secret("two"));
        assert_eq!(a.cookie_key().master(), b.cookie_key().master());
        assert_ne!(a.cookie_key().master(), c.cookie_key().master());
    }

    #[test]
    fn key_space_uses_configured_prefix() {
        let mut config = AppConfig::with_secret("s");
        config.key_prefix = "rgdm".to_string();
        let state = AppState::in_memory(config);
        assert_eq!(state.keys.user("u1"), "rgdm:user:u1");
        assert!(state.verifier.is_none());
    }
}
