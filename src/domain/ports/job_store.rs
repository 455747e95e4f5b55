use async_trait::async_trait;
use serde_json::Value;

use crate::domain::entities::{Job, JobLog, LogLevel, NewJob};
use crate::domain::errors::WorkerResult;

/// Persistence for job rows and their append-only logs.
///
/// Lifecycle writes are the dispatcher's alone; `append_log` is used by the
/// per-job logger. Job rows are never deleted here (audit trail).
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn create(&self, job: &NewJob) -> WorkerResult<()>;

    async fn find_by_task_id(&self, task_id: &str) -> WorkerResult<Option<Job>>;

    /// Mark RUNNING and increment attempts. Sets `started_at` on the first
    /// attempt only. Returns the updated attempt count.
    async fn mark_running(&self, task_id: &str) -> WorkerResult<i32>;

    async fn mark_completed(&self, task_id: &str, result: &Value) -> WorkerResult<()>;

    /// Transient failure with retries remaining: `completed_at` stays null.
    async fn mark_retrying(&self, task_id: &str, error: &str) -> WorkerResult<()>;

    /// Terminal failure: stamps `completed_at` and stores the error reason.
    async fn mark_failed(&self, task_id: &str, error: &str) -> WorkerResult<()>;

    async fn append_log(
        &self,
        task_id: &str,
        level: LogLevel,
        message: &str,
        meta: Option<&Value>,
        row_number: Option<i64>,
    ) -> WorkerResult<()>;

    async fn list_logs(&self, task_id: &str) -> WorkerResult<Vec<JobLog>>;
}
