use std::sync::{Arc, RwLock};

use secrecy::SecretString;
use thiserror::Error;

/// Default route consumers are sent to after a 401 evicts the session.
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Failure reported by a [`TokenStore`] backend.
#[derive(Debug, Error)]
#[error("token storage failed: {0}")]
pub struct TokenStoreError(pub String);

/// Persistent home of the bearer token.
///
/// The client reads the token before every request and clears it on any
/// 401. Implementations decide where it lives (memory, a credentials file,
/// the OS keyring).
pub trait TokenStore: Send + Sync {
    /// The current token, if one is stored.
    fn load(&self) -> Option<SecretString>;

    /// Replace the stored token.
    fn store(&self, token: SecretString) -> Result<(), TokenStoreError>;

    /// Remove the stored token and any associated credentials.
    fn clear(&self) -> Result<(), TokenStoreError>;
}

/// Process-local token storage. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<SecretString>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-seeded with a token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(SecretString::from(token.into()))),
        }
    }

    /// Convenience for callers that want an `Arc<dyn TokenStore>` directly.
    pub fn shared(self) -> Arc<dyn TokenStore> {
        Arc::new(self)
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<SecretString> {
        self.token.read().ok().and_then(|guard| guard.clone())
    }

    fn store(&self, token: SecretString) -> Result<(), TokenStoreError> {
        let mut guard = self
            .token
            .write()
            .map_err(|_| TokenStoreError("token lock poisoned".into()))?;
        *guard = Some(token);
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        let mut guard = self
            .token
            .write()
            .map_err(|_| TokenStoreError("token lock poisoned".into()))?;
        *guard = None;
        Ok(())
    }
}

/// Session state observable by consumers.
///
/// `LoginRequired` is published whenever any request comes back 401,
/// no matter which resource issued it. Consumers react by routing the
/// user to `login_path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No token has been seen yet.
    Anonymous,
    /// A token is stored.
    Authenticated,
    /// Credentials were evicted after a 401.
    LoginRequired { login_path: String },
}
