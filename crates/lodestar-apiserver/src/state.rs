use lodestar_scheduler::Extender;
use std::sync::Arc;

/// Default cap on extender request bodies; full node lists of large clusters are big
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Evaluation engine; immutable once the server starts
    pub extender: Arc<Extender>,

    /// Largest accepted `filter`/`prioritize` body
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(extender: Extender) -> Self {
        Self {
            extender: Arc::new(extender),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}
