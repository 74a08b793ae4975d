//! Persisted token store.

use std::sync::Arc;

use super::{Storage, StorageError};

/// Storage key for the short-lived access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Storage key for the long-lived refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// The session's view of the two persisted JWTs.
///
/// Tokens are owned by the session and mirrored to durable storage on every
/// change. Reads degrade to "no token" when the backing store fails: a broken
/// store means an anonymous session, not a crash.
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn Storage>,
}

impl TokenStore {
    /// Create a token store over a storage backend.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// The stored access token, if any.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        read_token(self.storage.as_ref(), ACCESS_TOKEN_KEY)
    }

    /// The stored refresh token, if any.
    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        read_token(self.storage.as_ref(), REFRESH_TOKEN_KEY)
    }

    /// Persist both tokens of a freshly created session.
    ///
    /// # Errors
    ///
    /// Returns an error if either token cannot be made durable.
    pub fn store_pair(&self, access: &str, refresh: &str) -> Result<(), StorageError> {
        self.storage.set(ACCESS_TOKEN_KEY, access)?;
        self.storage.set(REFRESH_TOKEN_KEY, refresh)
    }

    /// Persist a refreshed access token, leaving the refresh token in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be made durable.
    pub fn store_access(&self, access: &str) -> Result<(), StorageError> {
        self.storage.set(ACCESS_TOKEN_KEY, access)
    }

    /// Remove both tokens.
    ///
    /// Failures are logged rather than returned: clearing happens on the way
    /// out of a session, where there is nothing useful left to do about them.
    pub fn clear(&self) {
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            if let Err(err) = self.storage.remove(key) {
                tracing::warn!(key, error = %err, "failed to clear stored token");
            }
        }
    }
}

fn read_token(storage: &dyn Storage, key: &str) -> Option<String> {
    match storage.get(key) {
        Ok(token) => token.filter(|t| !t.is_empty()),
        Err(err) => {
            tracing::warn!(key, error = %err, "failed to read stored token");
            None
        }
    }
}
