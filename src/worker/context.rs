use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::domain::entities::LogLevel;
use crate::domain::ports::JobStore;

/// Operator-visible logger bound to one job. Every line lands in `job_logs`;
/// a failed write is downgraded to a process-level warning so logging can
/// never crash the job it is describing.
#[derive(Clone)]
pub struct JobLogger {
    task_id: String,
    store: Arc<dyn JobStore>,
}

impl JobLogger {
    pub fn new(task_id: String, store: Arc<dyn JobStore>) -> Self {
        Self { task_id, store }
    }

    pub async fn log(
        &self,
        level: LogLevel,
        message: &str,
        meta: Option<&Value>,
        row_number: Option<i64>,
    ) {
        if let Err(e) = self
            .store
            .append_log(&self.task_id, level, message, meta, row_number)
            .await
        {
            warn!(
                task_id = %self.task_id,
                "Failed to write job log '{}': {}",
                message, e
            );
        }
    }

    pub async fn info(&self, message: &str) {
        self.log(LogLevel::Info, message, None, None).await;
    }

    pub async fn error(&self, message: &str) {
        self.log(LogLevel::Error, message, None, None).await;
    }

    pub async fn row_info(&self, row_number: i64, message: &str) {
        self.log(LogLevel::Info, message, None, Some(row_number)).await;
    }

    pub async fn row_error(&self, row_number: i64, message: &str) {
        self.log(LogLevel::Error, message, None, Some(row_number)).await;
    }
}

/// File fetched from object storage for a job, if the job references one.
#[derive(Debug, Clone)]
pub struct JobFile {
    pub name: Option<String>,
    pub bytes: Vec<u8>,
}

/// Everything a handler gets for one execution.
pub struct JobContext {
    pub task_id: String,
    pub job_type: String,
    pub payload: Value,
    pub file: Option<JobFile>,
    pub logger: JobLogger,
}

impl JobContext {
    /// File bytes, or a configuration error when the handler requires one.
    pub fn require_file(&self) -> Result<&JobFile, crate::domain::errors::WorkerError> {
        self.file.as_ref().ok_or_else(|| {
            crate::domain::errors::WorkerError::Config("job has no associated file".to_string())
        })
    }
}
