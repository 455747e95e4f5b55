use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::entities::{Job, JobLog, JobStatus, LogLevel, NewJob};
use crate::domain::errors::WorkerResult;
use crate::domain::ports::JobStore;
use crate::infrastructure::persistence::{
    format_date, parse_date_col, parse_opt_date_col, Database,
};

/// SQL-backed job store. Lifecycle updates are plain status writes; the
/// attempts counter is incremented in the same statement that marks the job
/// running so a crash between the two cannot skew it.
#[derive(Clone)]
pub struct SqlJobStore {
    db: Database,
}

impl SqlJobStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn row_to_job(row: &sqlx::any::AnyRow) -> WorkerResult<Job> {
        let status: String = row.try_get("status")?;
        let payload: Option<String> = row.try_get("payload").ok();
        let result: Option<String> = row.try_get("result").ok();

        Ok(Job {
            task_id: row.try_get("task_id")?,
            job_type: row.try_get("job_type")?,
            status: JobStatus::from(status),
            attempts: row.try_get("attempts")?,
            max_attempts: row.try_get("max_attempts")?,
            payload: payload
                .and_then(|p| serde_json::from_str(&p).ok())
                .unwrap_or(Value::Null),
            file_key: row.try_get("file_key").ok(),
            file_name: row.try_get("file_name").ok(),
            result: result.and_then(|r| serde_json::from_str(&r).ok()),
            error_reason: row.try_get("error_reason").ok(),
            created_at: parse_date_col(row, "created_at")?,
            started_at: parse_opt_date_col(row, "started_at"),
            completed_at: parse_opt_date_col(row, "completed_at"),
        })
    }
}

#[async_trait]
impl JobStore for SqlJobStore {
    async fn create(&self, job: &NewJob) -> WorkerResult<()> {
        let payload = serde_json::to_string(&job.payload)?;

        sqlx::query(
            "INSERT INTO jobs (task_id, job_type, status, attempts, max_attempts, payload, file_key, file_name, created_at)
             VALUES (?, ?, 'pending', 0, ?, ?, ?, ?, ?)",
        )
        .bind(&job.task_id)
        .bind(&job.job_type)
        .bind(job.max_attempts)
        .bind(&payload)
        .bind(job.file_key.as_deref())
        .bind(job.file_name.as_deref())
        .bind(format_date(Utc::now()))
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    async fn find_by_task_id(&self, task_id: &str) -> WorkerResult<Option<Job>> {
        let row = sqlx::query(
            "SELECT task_id, job_type, status, attempts, max_attempts, payload,
                    file_key, file_name, result, error_reason,
                    created_at, started_at, completed_at
             FROM jobs WHERE task_id = ?",
        )
        .bind(task_id)
        .fetch_optional(self.db.pool())
        .await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_job(&row)?)),
            None => Ok(None),
        }
    }

    async fn mark_running(&self, task_id: &str) -> WorkerResult<i32> {
        let now = format_date(Utc::now());

        sqlx::query(
            "UPDATE jobs
             SET status = 'running', attempts = attempts + 1,
                 started_at = COALESCE(started_at, ?)
             WHERE task_id = ?",
        )
        .bind(&now)
        .bind(task_id)
        .execute(self.db.pool())
        .await?;

        let row = sqlx::query("SELECT attempts FROM jobs WHERE task_id = ?")
            .bind(task_id)
            .fetch_one(self.db.pool())
            .await?;

        Ok(row.try_get("attempts")?)
    }

    async fn mark_completed(&self, task_id: &str, result: &Value) -> WorkerResult<()> {
        let result = serde_json::to_string(result)?;

        sqlx::query(
            "UPDATE jobs
             SET status = 'completed', result = ?, completed_at = ?
             WHERE task_id = ?",
        )
        .bind(&result)
        .bind(format_date(Utc::now()))
        .bind(task_id)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    async fn mark_retrying(&self, task_id: &str, _error: &str) -> WorkerResult<()> {
        // completed_at stays null; the error reason is only persisted once
        // the failure is terminal.
        sqlx::query("UPDATE jobs SET status = 'retrying' WHERE task_id = ?")
            .bind(task_id)
            .execute(self.db.pool())
            .await?;

        Ok(())
    }

    async fn mark_failed(&self, task_id: &str, error: &str) -> WorkerResult<()> {
        sqlx::query(
            "UPDATE jobs
             SET status = 'failed', error_reason = ?, completed_at = ?
             WHERE task_id = ?",
        )
        .bind(error)
        .bind(format_date(Utc::now()))
        .bind(task_id)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    async fn append_log(
        &self,
        task_id: &str,
        level: LogLevel,
        message: &str,
        meta: Option<&Value>,
        row_number: Option<i64>,
    ) -> WorkerResult<()> {
        let meta = match meta {
            Some(value) => Some(serde_json::to_string(value)?),
            None => None,
        };

        sqlx::query(
            "INSERT INTO job_logs (id, task_id, level, message, meta, row_number, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(task_id)
        .bind(level.as_str())
        .bind(message)
        .bind(meta.as_deref())
        .bind(row_number)
        .bind(format_date(Utc::now()))
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    async fn list_logs(&self, task_id: &str) -> WorkerResult<Vec<JobLog>> {
        let rows = sqlx::query(
            "SELECT id, task_id, level, message, meta, row_number, created_at
             FROM job_logs
             WHERE task_id = ?
             ORDER BY created_at ASC, id ASC",
        )
        .bind(task_id)
        .fetch_all(self.db.pool())
        .await?;

        let mut logs = Vec::new();
        for row in rows {
            let level: String = row.try_get("level")?;
            let meta: Option<String> = row.try_get("meta").ok();
            logs.push(JobLog {
                id: row.try_get("id")?,
                task_id: row.try_get("task_id")?,
                level: LogLevel::from(level),
                message: row.try_get("message")?,
                meta: meta.and_then(|m| serde_json::from_str(&m).ok()),
                row_number: row.try_get("row_number").ok(),
                created_at: parse_date_col(&row, "created_at")?,
            });
        }

        Ok(logs)
    }
}
