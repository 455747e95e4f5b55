use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::errors::{WorkerError, WorkerResult};
use crate::domain::ports::FileStorage;

/// Object storage backed by a local directory; keys are paths under the root.
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, key: &str) -> WorkerResult<PathBuf> {
        // Reject traversal outside the root.
        let relative = Path::new(key);
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(WorkerError::Storage(format!("invalid storage key '{}'", key)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn save(&self, key: &str, content: &[u8]) -> WorkerResult<()> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, content).await?;
        Ok(())
    }

    async fn read(&self, key: &str) -> WorkerResult<Vec<u8>> {
        let path = self.resolve(key)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| WorkerError::Storage(format!("cannot read '{}': {}", key, e)))
    }

    async fn exists(&self, key: &str) -> WorkerResult<bool> {
        let path = self.resolve(key)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }
}
