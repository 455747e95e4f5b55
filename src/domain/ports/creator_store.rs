use async_trait::async_trait;

use crate::domain::entities::{Creator, CreatorPatch, CreatorSocial, CreatorSocialPatch};
use crate::domain::errors::WorkerResult;

/// Persistence for creators and their social accounts.
///
/// Name lookup is case-insensitive and returns soft-deleted rows too, with an
/// active row winning when both exist; callers branch on `deleted_at`.
#[async_trait]
pub trait CreatorStore: Send + Sync {
    async fn find_by_name(&self, full_name: &str) -> WorkerResult<Option<Creator>>;

    async fn create(&self, creator: &Creator) -> WorkerResult<()>;

    /// Merge non-empty patch fields into an existing row; `None` fields keep
    /// their stored values.
    async fn merge_update(&self, id: &str, patch: &CreatorPatch) -> WorkerResult<()>;

    /// Clear the soft-delete marker and merge the patch in the same write.
    async fn restore(&self, id: &str, patch: &CreatorPatch) -> WorkerResult<()>;

    /// Lookup by the unique platform + handle pair, deleted rows included.
    async fn find_social(&self, platform: &str, handle: &str)
        -> WorkerResult<Option<CreatorSocial>>;

    async fn create_social(&self, social: &CreatorSocial) -> WorkerResult<()>;

    async fn merge_update_social(
        &self,
        id: &str,
        patch: &CreatorSocialPatch,
    ) -> WorkerResult<()>;

    /// Restore a soft-deleted social, merging the patch and re-pointing it at
    /// the given creator.
    async fn restore_social(
        &self,
        id: &str,
        creator_id: &str,
        patch: &CreatorSocialPatch,
    ) -> WorkerResult<()>;
}
