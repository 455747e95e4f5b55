use async_trait::async_trait;

use crate::domain::entities::{Delivery, JobMessage};
use crate::domain::errors::WorkerResult;

/// Delivery queue feeding the dispatcher. Received messages stay invisible
/// for a visibility window; `ack` consumes them, `release` makes a failed
/// message immediately visible again for redelivery.
#[async_trait]
pub trait MessageQueue: Send + Sync {
    async fn send(&self, message: &JobMessage) -> WorkerResult<String>;

    async fn receive(&self, max_messages: u32) -> WorkerResult<Vec<Delivery>>;

    async fn ack(&self, receipt: &str) -> WorkerResult<()>;

    async fn release(&self, receipt: &str) -> WorkerResult<()>;
}
