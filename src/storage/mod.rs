//! Pluggable storage backends
//!
//! A process-wide configuration value selects between the local SQLite
//! engine and a remote hosted alternative. Both expose the same operation
//! surface so callers can swap backends transparently. The remote
//! implementation itself lives outside this server.

mod local;

pub use local::LocalStorage;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{Config, StorageBackend};
use crate::db::{Highlight, StoreError, StoreOptions, StoredPdf};

/// The operation surface every backend exposes.
#[async_trait]
pub trait AnnotationStorage: Send + Sync {
    async fn save_pdf(&self, path: &Path, id: &str) -> Result<(), StoreError>;
    async fn get_pdf(&self, id: &str) -> Result<StoredPdf, StoreError>;
    async fn delete_pdf(&self, id: &str) -> Result<bool, StoreError>;
    async fn save_highlight(&self, highlight: &Highlight) -> Result<(), StoreError>;
    async fn save_bulk_highlights(&self, highlights: &[Highlight]) -> Result<(), StoreError>;
    async fn highlights_for_pdf(&self, pdf_id: &str) -> Result<Vec<Highlight>, StoreError>;
    async fn delete_highlight(&self, pdf_id: &str, id: &str) -> Result<bool, StoreError>;
}

/// Select the backend named by the configuration.
pub fn from_config(config: &Config) -> anyhow::Result<Arc<dyn AnnotationStorage>> {
    match config.backend {
        StorageBackend::Sqlite => {
            let options = StoreOptions::new(config.database.url.clone());
            Ok(Arc::new(LocalStorage::new(options)))
        }
        StorageBackend::Remote => anyhow::bail!(
            "STORAGE_BACKEND=remote selected, but the hosted backend is not compiled into this server"
        ),
    }
}
