//! Resolves stored credentials into a validated session.

use std::sync::Arc;
use std::time::Duration;

use hd_common::{ClientError, Result, Role, Session};
use hd_store::{CredentialKey, CredentialStore};
use tracing::{debug, warn};

use crate::retry::{poll_until, Sleep, TokioSleep};

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Explicit values passed through navigation context. When present they
/// take precedence over stored values.
#[derive(Debug, Clone, Default)]
pub struct SessionOverrides {
    pub user_id: Option<String>,
    pub role: Option<Role>,
}

/// Derives a [`Session`] from the credential store.
///
/// The token read polls up to three times with a 500 ms pause, because a
/// read immediately after the login write may not see the value yet. A
/// token that is absent, empty, or the literal `"null"` counts as a failed
/// attempt. User id and role are read once; if either is ultimately absent
/// the outcome is [`ClientError::SessionMissing`].
pub struct SessionResolver {
    store: Arc<dyn CredentialStore>,
    max_attempts: u32,
    retry_delay: Duration,
    sleeper: Arc<dyn Sleep>,
}

impl SessionResolver {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self::with_policy(
            store,
            DEFAULT_MAX_ATTEMPTS,
            DEFAULT_RETRY_DELAY,
            Arc::new(TokioSleep),
        )
    }

    pub fn with_policy(
        store: Arc<dyn CredentialStore>,
        max_attempts: u32,
        retry_delay: Duration,
        sleeper: Arc<dyn Sleep>,
    ) -> Self {
        Self {
            store,
            max_attempts,
            retry_delay,
            sleeper,
        }
    }

    pub async fn resolve(&self) -> Result<Session> {
        self.resolve_with(SessionOverrides::default()).await
    }

    pub async fn resolve_with(&self, overrides: SessionOverrides) -> Result<Session> {
        let token = self.poll_token().await.ok_or(ClientError::SessionMissing)?;

        let user_id = match overrides.user_id.filter(|v| !v.is_empty()) {
            Some(user_id) => user_id,
            None => self
                .store
                .get(CredentialKey::UserId)
                .await?
                .filter(|v| !v.is_empty())
                .ok_or(ClientError::SessionMissing)?,
        };

        let role = match overrides.role {
            Some(role) => role,
            None => self
                .store
                .get(CredentialKey::UserType)
                .await?
                .filter(|v| !v.is_empty())
                .map(|v| Role::from_store_str(&v))
                .ok_or(ClientError::SessionMissing)?,
        };

        debug!(user_id = %user_id, role = ?role, "session resolved");
        Ok(Session {
            token,
            user_id,
            role,
        })
    }

    /// Sequential bounded poll for the auth token. A store read failure
    /// counts as a failed attempt rather than aborting the poll.
    async fn poll_token(&self) -> Option<String> {
        let store = self.store.clone();
        poll_until(
            self.max_attempts,
            self.retry_delay,
            self.sleeper.as_ref(),
            move || {
                let store = store.clone();
                async move {
                    match store.get(CredentialKey::AuthToken).await {
                        Ok(value) => value.filter(|t| usable_token(t)),
                        Err(e) => {
                            warn!(error = %e, "auth token read failed");
                            None
                        }
                    }
                }
            },
        )
        .await
    }
}

fn usable_token(token: &str) -> bool {
    !token.is_empty() && token != "null"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::NoopSleep;
    use async_trait::async_trait;
    use hd_store::{MemoryStore, StoreError};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Store whose token reads return a scripted sequence, to model the
    /// write/read race after login.
    struct StagedTokenStore {
        token_reads: Mutex<Vec<Option<String>>>,
        read_count: AtomicU32,
        inner: MemoryStore,
    }

    impl StagedTokenStore {
        fn new(token_reads: Vec<Option<&str>>) -> Self {
            Self {
                token_reads: Mutex::new(
                    token_reads
                        .into_iter()
                        .rev()
                        .map(|v| v.map(str::to_string))
                        .collect(),
                ),
                read_count: AtomicU32::new(0),
                inner: MemoryStore::new(),
            }
        }

        fn token_read_count(&self) -> u32 {
            self.read_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CredentialStore for StagedTokenStore {
        async fn get(
            &self,
            key: CredentialKey,
        ) -> std::result::Result<Option<String>, StoreError> {
            if key == CredentialKey::AuthToken {
                self.read_count.fetch_add(1, Ordering::SeqCst);
                return Ok(self.token_reads.lock().pop().flatten());
            }
            self.inner.get(key).await
        }

        async fn set(&self, key: CredentialKey, value: &str) -> std::result::Result<(), StoreError> {
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: CredentialKey) -> std::result::Result<(), StoreError> {
            self.inner.remove(key).await
        }

        fn name(&self) -> &str {
            "staged"
        }
    }

    fn resolver(store: Arc<dyn CredentialStore>) -> SessionResolver {
        SessionResolver::with_policy(
            store,
            DEFAULT_MAX_ATTEMPTS,
            DEFAULT_RETRY_DELAY,
            Arc::new(NoopSleep),
        )
    }

    async fn seed_identity(store: &dyn CredentialStore) {
        store.set(CredentialKey::UserId, "42").await.unwrap();
        store.set(CredentialKey::UserType, "student").await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_store_is_session_missing_after_three_polls() {
        let store = Arc::new(StagedTokenStore::new(vec![None, None, None, None]));
        let result = resolver(store.clone()).resolve().await;

        assert!(matches!(result, Err(ClientError::SessionMissing)));
        assert_eq!(store.token_read_count(), 3);
    }

    #[tokio::test]
    async fn test_token_on_second_poll_succeeds_without_third() {
        let store = Arc::new(StagedTokenStore::new(vec![None, Some("T1")]));
        seed_identity(store.as_ref()).await;

        let session = resolver(store.clone()).resolve().await.unwrap();
        assert_eq!(session.token, "T1");
        assert_eq!(session.user_id, "42");
        assert_eq!(session.role, Role::Student);
        assert_eq!(store.token_read_count(), 2);
    }

    #[tokio::test]
    async fn test_null_literal_token_counts_as_absent() {
        let store = Arc::new(StagedTokenStore::new(vec![
            Some("null"),
            Some(""),
            Some("T2"),
        ]));
        seed_identity(store.as_ref()).await;

        let session = resolver(store.clone()).resolve().await.unwrap();
        assert_eq!(session.token, "T2");
        assert_eq!(store.token_read_count(), 3);
    }

    #[tokio::test]
    async fn test_token_without_identity_is_session_missing() {
        let store = Arc::new(MemoryStore::new());
        store.set(CredentialKey::AuthToken, "T1").await.unwrap();

        let result = resolver(store).resolve().await;
        assert!(matches!(result, Err(ClientError::SessionMissing)));
    }

    #[tokio::test]
    async fn test_overrides_take_precedence_over_store() {
        let store = Arc::new(MemoryStore::new());
        store.set(CredentialKey::AuthToken, "T1").await.unwrap();
        store.set(CredentialKey::UserId, "42").await.unwrap();
        store.set(CredentialKey::UserType, "student").await.unwrap();

        let session = resolver(store)
            .resolve_with(SessionOverrides {
                user_id: Some("77".to_string()),
                role: Some(Role::Employee),
            })
            .await
            .unwrap();

        assert_eq!(session.user_id, "77");
        assert_eq!(session.role, Role::Employee);
    }

    #[tokio::test]
    async fn test_overrides_alone_still_need_token() {
        let store = Arc::new(MemoryStore::new());
        let result = resolver(store)
            .resolve_with(SessionOverrides {
                user_id: Some("77".to_string()),
                role: Some(Role::Employee),
            })
            .await;

        assert!(matches!(result, Err(ClientError::SessionMissing)));
    }

    #[tokio::test]
    async fn test_unrecognized_stored_role_resolves_as_unknown() {
        let store = Arc::new(MemoryStore::new());
        store.set(CredentialKey::AuthToken, "T1").await.unwrap();
        store.set(CredentialKey::UserId, "42").await.unwrap();
        store.set(CredentialKey::UserType, "superuser").await.unwrap();

        let session = resolver(store).resolve().await.unwrap();
        assert_eq!(session.role, Role::Unknown);
    }
}
