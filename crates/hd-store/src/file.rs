use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::{CredentialKey, CredentialStore, StoreError};

/// File-backed credential store.
///
/// Persists the triple as a JSON object in a single file under the data
/// directory, created on first write. Durable across process restarts.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    const FILE_NAME: &'static str = "credentials.json";

    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(Self::FILE_NAME),
        }
    }

    async fn load(&self) -> Result<HashMap<String, String>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn persist(&self, values: &HashMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let contents = serde_json::to_string_pretty(values)?;
        tokio::fs::write(&self.path, contents).await?;
        debug!(path = %self.path.display(), "credentials persisted");
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileStore {
    async fn get(&self, key: CredentialKey) -> Result<Option<String>, StoreError> {
        Ok(self.load().await?.remove(key.as_str()))
    }

    async fn set(&self, key: CredentialKey, value: &str) -> Result<(), StoreError> {
        let mut values = self.load().await?;
        values.insert(key.as_str().to_string(), value.to_string());
        self.persist(&values).await
    }

    async fn remove(&self, key: CredentialKey) -> Result<(), StoreError> {
        let mut values = self.load().await?;
        if values.remove(key.as_str()).is_some() {
            self.persist(&values).await?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}
