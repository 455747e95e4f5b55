use async_trait::async_trait;

use crate::domain::entities::{Customer, CustomerPatch};
use crate::domain::errors::WorkerResult;

/// Persistence for customer records. Same soft-delete conventions as
/// `CreatorStore`: name lookup is case-insensitive, returns deleted matches,
/// and prefers an active row when both exist.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn find_by_name(&self, name: &str) -> WorkerResult<Option<Customer>>;

    async fn create(&self, customer: &Customer) -> WorkerResult<()>;

    async fn merge_update(&self, id: &str, patch: &CustomerPatch) -> WorkerResult<()>;

    async fn restore(&self, id: &str, patch: &CustomerPatch) -> WorkerResult<()>;
}
