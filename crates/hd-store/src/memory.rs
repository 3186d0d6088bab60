use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{CredentialKey, CredentialStore, StoreError};

/// In-memory credential store.
///
/// Ephemeral; suited to tests and to sessions that should not outlive the
/// process.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<CredentialKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn get(&self, key: CredentialKey) -> Result<Option<String>, StoreError> {
        Ok(self.values.lock().get(&key).cloned())
    }

    async fn set(&self, key: CredentialKey, value: &str) -> Result<(), StoreError> {
        self.values.lock().insert(key, value.to_string());
        Ok(())
    }

    async fn remove(&self, key: CredentialKey) -> Result<(), StoreError> {
        self.values.lock().remove(&key);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get(CredentialKey::AuthToken).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = MemoryStore::new();
        store.set(CredentialKey::UserId, "42").await.unwrap();
        assert_eq!(
            store.get(CredentialKey::UserId).await.unwrap(),
            Some("42".to_string())
        );

        store.remove(CredentialKey::UserId).await.unwrap();
        assert_eq!(store.get(CredentialKey::UserId).await.unwrap(), None);

        // removing again is fine
        store.remove(CredentialKey::UserId).await.unwrap();
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let store = MemoryStore::new();
        store.set(CredentialKey::AuthToken, "old").await.unwrap();
        store.set(CredentialKey::AuthToken, "new").await.unwrap();
        assert_eq!(
            store.get(CredentialKey::AuthToken).await.unwrap(),
            Some("new".to_string())
        );
    }
}
