mod creator_store;
mod customer_store;
mod file_storage;
mod job_store;
mod message_queue;

pub use creator_store::CreatorStore;
pub use customer_store::CustomerStore;
pub use file_storage::FileStorage;
pub use job_store::JobStore;
pub use message_queue::MessageQueue;
