use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::domain::ports::MessageQueue;
use crate::worker::dispatcher::JobDispatcher;

/// Long-running poll loop: receive a batch, dispatch it, ack the consumed
/// messages and release the ones reported failed, then idle briefly when the
/// queue is empty.
pub struct WorkerLoop {
    queue: Arc<dyn MessageQueue>,
    dispatcher: JobDispatcher,
    batch_size: u32,
    poll_interval: Duration,
}

impl WorkerLoop {
    pub fn new(
        queue: Arc<dyn MessageQueue>,
        dispatcher: JobDispatcher,
        batch_size: u32,
        poll_interval: Duration,
    ) -> Self {
        Self {
            queue,
            dispatcher,
            batch_size,
            poll_interval,
        }
    }

    pub async fn run(&self) {
        info!("Worker loop started (batch size {})", self.batch_size);
        loop {
            match self.tick().await {
                Ok(processed) if processed > 0 => continue,
                Ok(_) => tokio::time::sleep(self.poll_interval).await,
                Err(e) => {
                    error!("Error polling queue: {}", e);
                    tokio::time::sleep(self.poll_interval * 5).await;
                }
            }
        }
    }

    /// One receive/dispatch/settle cycle. Returns the number of messages
    /// pulled from the queue.
    pub async fn tick(&self) -> crate::domain::errors::WorkerResult<usize> {
        let batch = self.queue.receive(self.batch_size).await?;
        if batch.is_empty() {
            return Ok(0);
        }

        let failed = self.dispatcher.process_batch(&batch).await;

        for delivery in &batch {
            let settle = if failed.contains(&delivery.receipt) {
                self.queue.release(&delivery.receipt).await
            } else {
                self.queue.ack(&delivery.receipt).await
            };
            if let Err(e) = settle {
                error!(receipt = %delivery.receipt, "Failed to settle message: {}", e);
            }
        }

        Ok(batch.len())
    }
}
