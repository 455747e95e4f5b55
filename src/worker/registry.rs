use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::domain::errors::WorkerResult;
use crate::worker::context::JobContext;

/// Pluggable strategy implementing the logic for one job type.
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn execute(&self, ctx: &JobContext) -> WorkerResult<Value>;
}

/// Static job-type → handler map, populated once at bootstrap.
///
/// Registering an already-known type overwrites the previous handler with a
/// warning. An unknown type at dispatch time is a normal job failure, not a
/// panic, so `get` just returns `None`.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn JobHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, job_type: &str, handler: Arc<dyn JobHandler>) {
        if self.handlers.contains_key(job_type) {
            warn!("Overwriting existing handler for job type '{}'", job_type);
        }
        self.handlers.insert(job_type.to_string(), handler);
    }

    pub fn get(&self, job_type: &str) -> Option<Arc<dyn JobHandler>> {
        self.handlers.get(job_type).cloned()
    }

    pub fn registered_types(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopHandler(&'static str);

    #[async_trait]
    impl JobHandler for NoopHandler {
        async fn execute(&self, _ctx: &JobContext) -> WorkerResult<Value> {
            Ok(Value::String(self.0.to_string()))
        }
    }

    #[test]
    fn get_returns_none_for_unknown_type() {
        let registry = HandlerRegistry::new();
        assert!(registry.get("no-such-type").is_none());
    }

    #[test]
    fn register_overwrites_existing_handler() {
        let first: Arc<dyn JobHandler> = Arc::new(NoopHandler("first"));
        let second: Arc<dyn JobHandler> = Arc::new(NoopHandler("second"));

        let mut registry = HandlerRegistry::new();
        registry.register("import", Arc::clone(&first));
        registry.register("import", Arc::clone(&second));

        assert_eq!(registry.registered_types().len(), 1);
        let resolved = registry.get("import").unwrap();
        assert!(Arc::ptr_eq(&resolved, &second));
        assert!(!Arc::ptr_eq(&resolved, &first));
    }
}
