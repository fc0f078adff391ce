//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::storage::AnnotationStorage;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    storage: Arc<dyn AnnotationStorage>,
}

impl AppState {
    pub fn new(config: Config, storage: Arc<dyn AnnotationStorage>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, storage }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the selected storage backend
    pub fn storage(&self) -> &dyn AnnotationStorage {
        self.inner.storage.as_ref()
    }
}
