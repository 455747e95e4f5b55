mod creator;
mod customer;
mod job;

pub use creator::{Creator, CreatorPatch, CreatorSocial, CreatorSocialPatch};
pub use customer::{Customer, CustomerPatch};
pub use job::{
    Delivery, Job, JobLog, JobMessage, JobStatus, LogLevel, NewJob, DEFAULT_MAX_ATTEMPTS,
};
