use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub const DEFAULT_MAX_ATTEMPTS: i32 = 5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Retrying,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Retrying => "retrying",
        }
    }
}

impl From<String> for JobStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "running" => JobStatus::Running,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            "retrying" => JobStatus::Retrying,
            _ => JobStatus::Pending,
        }
    }
}

/// Persistent work item. Mutated only by the dispatcher (status, attempts,
/// result, error_reason) and never deleted in-band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub task_id: String,
    pub job_type: String,
    pub status: JobStatus,
    pub attempts: i32,
    pub max_attempts: i32,
    pub payload: Value,
    pub file_key: Option<String>,
    pub file_name: Option<String>,
    pub result: Option<Value>,
    pub error_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Fields needed to submit a new job. The store fills in the rest.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub task_id: String,
    pub job_type: String,
    pub payload: Value,
    pub file_key: Option<String>,
    pub file_name: Option<String>,
    pub max_attempts: i32,
}

impl NewJob {
    pub fn new(job_type: impl Into<String>, payload: Value) -> Self {
        Self {
            task_id: Uuid::new_v4().to_string(),
            job_type: job_type.into(),
            payload,
            file_key: None,
            file_name: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_file(mut self, key: impl Into<String>, name: impl Into<String>) -> Self {
        self.file_key = Some(key.into());
        self.file_name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        }
    }
}

impl From<String> for LogLevel {
    fn from(s: String) -> Self {
        match s.as_str() {
            "debug" => LogLevel::Debug,
            "warning" => LogLevel::Warning,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

/// Append-only operator-visible log line tied to a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobLog {
    pub id: String,
    pub task_id: String,
    pub level: LogLevel,
    pub message: String,
    pub meta: Option<Value>,
    pub row_number: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Queue message pointing at one job row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMessage {
    pub task_id: String,
    pub job_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

impl JobMessage {
    pub fn for_job(job: &NewJob) -> Self {
        Self {
            task_id: job.task_id.clone(),
            job_type: job.job_type.clone(),
            payload: None,
            file_url: None,
            user_id: None,
        }
    }
}

/// One received queue message plus the receipt used to ack or release it.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub receipt: String,
    pub message: JobMessage,
}
