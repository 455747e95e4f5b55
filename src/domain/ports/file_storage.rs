use async_trait::async_trait;

use crate::domain::errors::WorkerResult;

#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Save a file to the storage
    async fn save(&self, key: &str, content: &[u8]) -> WorkerResult<()>;

    /// Read a file from the storage
    async fn read(&self, key: &str) -> WorkerResult<Vec<u8>>;

    /// Check if a file exists
    async fn exists(&self, key: &str) -> WorkerResult<bool>;
}
