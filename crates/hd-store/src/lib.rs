//! Credential persistence for the mobile client core.
//!
//! Stores the three values that jointly define a usable session: the auth
//! token, the user id, and the user role. Absence of a key is a normal
//! value, not an error. Write visibility to a subsequent read is durable
//! but not guaranteed to be immediate; the session resolver's bounded poll
//! absorbs that window.

use async_trait::async_trait;
use hd_common::ClientError;
use thiserror::Error;

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// The three fixed credential keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKey {
    AuthToken,
    UserId,
    UserType,
}

impl CredentialKey {
    pub const ALL: [CredentialKey; 3] = [
        CredentialKey::AuthToken,
        CredentialKey::UserId,
        CredentialKey::UserType,
    ];

    /// Persisted key name.
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKey::AuthToken => "authToken",
            CredentialKey::UserId => "userId",
            CredentialKey::UserType => "userType",
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<StoreError> for ClientError {
    fn from(err: StoreError) -> Self {
        ClientError::store(err.to_string())
    }
}

/// Durable key/value persistence for the credential triple.
///
/// Injected everywhere it is read or written so tests can substitute an
/// in-memory fake.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Get a credential by key. Missing keys yield `Ok(None)`.
    async fn get(&self, key: CredentialKey) -> Result<Option<String>, StoreError>;

    /// Set a credential.
    async fn set(&self, key: CredentialKey, value: &str) -> Result<(), StoreError>;

    /// Remove a credential. Removing a missing key is a no-op.
    async fn remove(&self, key: CredentialKey) -> Result<(), StoreError>;

    /// Store name, for logging.
    fn name(&self) -> &str;
}

/// Remove all three credential keys.
///
/// Used for logout and login-failure teardown so a partial triple never
/// survives. Idempotent: clearing an already-empty store succeeds.
pub async fn clear_credentials(store: &dyn CredentialStore) -> Result<(), StoreError> {
    for key in CredentialKey::ALL {
        store.remove(key).await?;
    }
    tracing::debug!(store = %store.name(), "credential triple cleared");
    Ok(())
}
