use std::sync::Arc;

use tracing::{error, info};

use crate::domain::entities::{Delivery, JobMessage, JobStatus};
use crate::domain::errors::{WorkerError, WorkerResult};
use crate::domain::ports::{FileStorage, JobStore};
use crate::worker::context::{JobContext, JobFile, JobLogger};
use crate::worker::registry::HandlerRegistry;

/// Routes queue messages to handlers and keeps the job-row lifecycle honest:
/// RUNNING with an incremented attempt counter on entry, then COMPLETED,
/// RETRYING (retries remaining) or FAILED (attempts exhausted) on exit.
pub struct JobDispatcher {
    jobs: Arc<dyn JobStore>,
    storage: Arc<dyn FileStorage>,
    registry: Arc<HandlerRegistry>,
}

impl JobDispatcher {
    pub fn new(
        jobs: Arc<dyn JobStore>,
        storage: Arc<dyn FileStorage>,
        registry: Arc<HandlerRegistry>,
    ) -> Self {
        Self {
            jobs,
            storage,
            registry,
        }
    }

    /// Process a batch of deliveries independently and return the receipts of
    /// the ones that should be redelivered. Succeeded and terminally failed
    /// messages are not in the returned list, so the queue consumes them.
    pub async fn process_batch(&self, batch: &[Delivery]) -> Vec<String> {
        let mut failed = Vec::new();
        for delivery in batch {
            if let Err(e) = self.process_message(&delivery.message).await {
                error!(
                    task_id = %delivery.message.task_id,
                    "Job attempt failed, scheduling redelivery: {}", e
                );
                failed.push(delivery.receipt.clone());
            }
        }
        failed
    }

    /// Returns `Err` only when the message should be redelivered. Terminal
    /// outcomes (success, attempts exhausted, unknown task id) return `Ok`.
    pub async fn process_message(&self, message: &JobMessage) -> WorkerResult<()> {
        let job = match self.jobs.find_by_task_id(&message.task_id).await? {
            Some(job) => job,
            None => {
                // An invalid id cannot become valid by waiting, so the
                // message is consumed rather than retried.
                error!(
                    task_id = %message.task_id,
                    "Dropping message for unknown job"
                );
                return Ok(());
            }
        };

        // At-least-once delivery can replay a message whose job already
        // finished (crash between the terminal write and the ack). Terminal
        // states stay terminal.
        if matches!(job.status, JobStatus::Completed | JobStatus::Failed) {
            info!(
                task_id = %job.task_id,
                status = job.status.as_str(),
                "Dropping redelivered message for finished job"
            );
            return Ok(());
        }

        let attempts = self.jobs.mark_running(&job.task_id).await?;
        let logger = JobLogger::new(job.task_id.clone(), Arc::clone(&self.jobs));
        logger
            .info(&format!(
                "Starting job '{}' (attempt {} of {})",
                job.job_type, attempts, job.max_attempts
            ))
            .await;

        let outcome = self.execute(&job, &message.job_type, &logger).await;

        match outcome {
            Ok(result) => {
                self.jobs.mark_completed(&job.task_id, &result).await?;
                logger.info("Job completed successfully").await;
                info!(task_id = %job.task_id, job_type = %job.job_type, "Job completed");
                Ok(())
            }
            Err(e) => {
                let reason = e.to_string();
                logger.error(&format!("Job failed: {}", reason)).await;
                if attempts < job.max_attempts {
                    self.jobs.mark_retrying(&job.task_id, &reason).await?;
                    Err(e)
                } else {
                    self.jobs.mark_failed(&job.task_id, &reason).await?;
                    error!(
                        task_id = %job.task_id,
                        attempts, "Job failed permanently: {}", reason
                    );
                    Ok(())
                }
            }
        }
    }

    async fn execute(
        &self,
        job: &crate::domain::entities::Job,
        job_type: &str,
        logger: &JobLogger,
    ) -> WorkerResult<serde_json::Value> {
        let handler = self
            .registry
            .get(job_type)
            .ok_or_else(|| WorkerError::HandlerNotFound(job_type.to_string()))?;

        let file = match &job.file_key {
            Some(key) => Some(JobFile {
                name: job.file_name.clone(),
                bytes: self.storage.read(key).await?,
            }),
            None => None,
        };

        let ctx = JobContext {
            task_id: job.task_id.clone(),
            job_type: job_type.to_string(),
            payload: job.payload.clone(),
            file,
            logger: logger.clone(),
        };

        handler.execute(&ctx).await
    }
}
