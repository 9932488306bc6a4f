//! Application state
//!
//! Built once at startup and shared read-only by every request through
//! `Arc<AppState>`. Nothing in here is mutated on the request path.

use bizdesk_core::{CategoryTable, Config};
use bizdesk_storage::Storage;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Category to directory, ceiling and rule. Immutable after startup.
    pub categories: Arc<CategoryTable>,
    pub storage: Arc<dyn Storage>,
}

impl AppState {
    pub fn new(config: Config, categories: CategoryTable, storage: Arc<dyn Storage>) -> Self {
        Self {
            config,
            categories: Arc::new(categories),
            storage,
        }
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.config.upload_timeout_secs())
    }
}
