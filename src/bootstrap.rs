use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::handlers::{
    ClientImportHandler, CreatorImportHandler, CLIENT_IMPORT, CREATOR_IMPORT, INFLUENCER_IMPORT,
};
use crate::infrastructure::persistence::{
    Database, SqlCreatorStore, SqlCustomerStore, SqlJobStore, SqlMessageQueue,
};
use crate::infrastructure::storage::LocalFileStorage;
use crate::worker::{HandlerRegistry, JobDispatcher, WorkerLoop};

/// Handler registry with every production job type wired in. The registry is
/// built once per process and shared behind an Arc.
pub fn build_registry(db: &Database) -> HandlerRegistry {
    let creators = Arc::new(SqlCreatorStore::new(db.clone()));
    let customers = Arc::new(SqlCustomerStore::new(db.clone()));

    let creator_import = Arc::new(CreatorImportHandler::new(creators));
    let client_import = Arc::new(ClientImportHandler::new(customers));

    let mut registry = HandlerRegistry::new();
    registry.register(CREATOR_IMPORT, creator_import.clone());
    registry.register(INFLUENCER_IMPORT, creator_import);
    registry.register(CLIENT_IMPORT, client_import);
    registry
}

pub fn build_worker(db: &Database, config: &Config) -> WorkerLoop {
    let jobs = Arc::new(SqlJobStore::new(db.clone()));
    let storage = Arc::new(LocalFileStorage::new(config.storage_dir.clone()));
    let queue = Arc::new(SqlMessageQueue::new(
        db.clone(),
        config.visibility_timeout_secs,
    ));
    let registry = Arc::new(build_registry(db));

    let dispatcher = JobDispatcher::new(jobs, storage, registry);

    WorkerLoop::new(
        queue,
        dispatcher,
        config.batch_size,
        Duration::from_secs(config.poll_interval_secs),
    )
}
