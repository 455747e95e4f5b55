use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::Value;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::entities::{Delivery, JobMessage};
use crate::domain::errors::WorkerResult;
use crate::domain::ports::MessageQueue;
use crate::infrastructure::persistence::{format_date, Database};

/// Database-backed delivery queue.
///
/// `receive` locks messages behind a visibility timeout with a guarded
/// per-message UPDATE, so two workers pulling concurrently cannot take the
/// same message. `ack` deletes; `release` makes the message visible again
/// immediately, which is how a retrying job gets redelivered.
#[derive(Clone)]
pub struct SqlMessageQueue {
    db: Database,
    visibility_timeout: Duration,
}

impl SqlMessageQueue {
    pub fn new(db: Database, visibility_timeout_secs: i64) -> Self {
        Self {
            db,
            visibility_timeout: Duration::seconds(visibility_timeout_secs),
        }
    }
}

#[async_trait]
impl MessageQueue for SqlMessageQueue {
    async fn send(&self, message: &JobMessage) -> WorkerResult<String> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let payload = match &message.payload {
            Some(value) => Some(serde_json::to_string(value)?),
            None => None,
        };

        sqlx::query(
            "INSERT INTO queue_messages (id, task_id, job_type, payload, file_url, user_id, visible_at, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&message.task_id)
        .bind(&message.job_type)
        .bind(payload.as_deref())
        .bind(message.file_url.as_deref())
        .bind(message.user_id)
        .bind(format_date(now))
        .bind(format_date(now))
        .execute(self.db.pool())
        .await?;

        Ok(id)
    }

    async fn receive(&self, max_messages: u32) -> WorkerResult<Vec<Delivery>> {
        let now = Utc::now();
        let lock_until = now + self.visibility_timeout;

        let mut tx = self.db.pool().begin().await?;

        let candidates = sqlx::query(
            "SELECT id FROM queue_messages
             WHERE visible_at <= ?
             ORDER BY created_at ASC
             LIMIT ?",
        )
        .bind(format_date(now))
        .bind(max_messages as i64)
        .fetch_all(&mut *tx)
        .await?;

        let mut deliveries = Vec::new();
        for candidate in candidates {
            let id: String = candidate.try_get("id")?;

            // Guarded lock: if another worker already took this message the
            // update matches no rows and we just move on.
            let locked = sqlx::query(
                "UPDATE queue_messages
                 SET visible_at = ?, received_count = received_count + 1
                 WHERE id = ? AND visible_at <= ?",
            )
            .bind(format_date(lock_until))
            .bind(&id)
            .bind(format_date(now))
            .execute(&mut *tx)
            .await?;

            if locked.rows_affected() == 0 {
                continue;
            }

            let row = sqlx::query(
                "SELECT task_id, job_type, payload, file_url, user_id
                 FROM queue_messages WHERE id = ?",
            )
            .bind(&id)
            .fetch_one(&mut *tx)
            .await?;

            let payload: Option<String> = row.try_get("payload").ok();
            deliveries.push(Delivery {
                receipt: id,
                message: JobMessage {
                    task_id: row.try_get("task_id")?,
                    job_type: row.try_get("job_type")?,
                    payload: payload.and_then(|p| serde_json::from_str::<Value>(&p).ok()),
                    file_url: row.try_get("file_url").ok(),
                    user_id: row.try_get("user_id").ok(),
                },
            });
        }

        tx.commit().await?;

        Ok(deliveries)
    }

    async fn ack(&self, receipt: &str) -> WorkerResult<()> {
        sqlx::query("DELETE FROM queue_messages WHERE id = ?")
            .bind(receipt)
            .execute(self.db.pool())
            .await?;

        Ok(())
    }

    async fn release(&self, receipt: &str) -> WorkerResult<()> {
        sqlx::query("UPDATE queue_messages SET visible_at = ? WHERE id = ?")
            .bind(format_date(Utc::now()))
            .bind(receipt)
            .execute(self.db.pool())
            .await?;

        Ok(())
    }
}
