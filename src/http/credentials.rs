//! Credential providers
//!
//! The client asks its provider for a bearer token on every request, so a
//! token obtained after login is picked up without rebuilding the client.

use std::sync::Arc;

use parking_lot::RwLock;

/// Source of the bearer token attached to outgoing requests
pub trait CredentialProvider: Send + Sync {
    /// Current token, or `None` to send the request unauthenticated
    fn bearer_token(&self) -> Option<String>;
}

/// Never attaches credentials
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl CredentialProvider for Anonymous {
    fn bearer_token(&self) -> Option<String> {
        None
    }
}

/// A fixed token, e.g. from configuration
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl CredentialProvider for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Shared, replaceable token slot
///
/// Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    token: Arc<RwLock<Option<String>>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.set(token);
        store
    }

    pub fn set(&self, token: impl Into<String>) {
        *self.token.write() = Some(token.into());
    }

    pub fn clear(&self) {
        *self.token.write() = None;
    }

    pub fn get(&self) -> Option<String> {
        self.token.read().clone()
    }
}

impl CredentialProvider for TokenStore {
    fn bearer_token(&self) -> Option<String> {
        // Empty tokens are treated as absent
        self.get().filter(|t| !t.is_empty())
    }
}
