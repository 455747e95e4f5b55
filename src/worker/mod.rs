pub mod context;
pub mod dispatcher;
pub mod registry;
pub mod runner;

pub use context::{JobContext, JobFile, JobLogger};
pub use dispatcher::JobDispatcher;
pub use registry::{HandlerRegistry, JobHandler};
pub use runner::WorkerLoop;
