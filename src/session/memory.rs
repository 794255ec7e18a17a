use std::collections::HashMap;
use std::sync::RwLock;

use super::{SessionError, TokenStore, token_cookie_name};

/// In-process token store keyed by cookie name.
///
/// Useful for hosts that manage their own cookie storage and hand the token
/// over at startup.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<HashMap<String, String>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `token` for `org_slug`.
    #[must_use]
    pub fn with_token(org_slug: &str, token: impl Into<String>) -> Self {
        let store = Self::default();
        if let Ok(mut tokens) = store.tokens.write() {
            tokens.insert(token_cookie_name(org_slug), token.into());
        }
        store
    }

    /// Stores `token` for `org_slug`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Poisoned`] if the lock was poisoned.
    pub fn insert(&self, org_slug: &str, token: impl Into<String>) -> Result<(), SessionError> {
        self.tokens
            .write()
            .map_err(|_| SessionError::Poisoned)?
            .insert(token_cookie_name(org_slug), token.into());
        Ok(())
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, org_slug: &str) -> Result<Option<String>, SessionError> {
        let tokens = self.tokens.read().map_err(|_| SessionError::Poisoned)?;
        Ok(tokens.get(&token_cookie_name(org_slug)).cloned())
    }

    fn remove(&self, org_slug: &str) -> Result<(), SessionError> {
        self.tokens
            .write()
            .map_err(|_| SessionError::Poisoned)?
            .remove(&token_cookie_name(org_slug));
        Ok(())
    }
}
