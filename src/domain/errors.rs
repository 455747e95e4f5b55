use thiserror::Error;

/// Error taxonomy for the worker.
///
/// `Config` covers conditions that cannot improve with a retry (bad payload,
/// missing column mapping, missing file). `Validation` is raised per CSV row
/// and caught at row scope by the import handlers. Everything else propagates
/// to the dispatcher, which applies the attempts-counter retry policy.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("job '{0}' not found")]
    JobNotFound(String),

    #[error("no handler registered for job type '{0}'")]
    HandlerNotFound(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type WorkerResult<T> = Result<T, WorkerError>;
