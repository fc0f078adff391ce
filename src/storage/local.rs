//! Local SQLite-backed storage
//!
//! Each operation opens its own [`Store`] and closes it on every exit path,
//! success or failure, so the single connection handle never leaks.

use std::path::Path;

use async_trait::async_trait;

use crate::db::{
    Highlight, HighlightRepository, PdfRepository, Store, StoreError, StoreOptions, StoredPdf,
};

use super::AnnotationStorage;

/// The local storage engine behind the [`AnnotationStorage`] surface.
pub struct LocalStorage {
    options: StoreOptions,
}

impl LocalStorage {
    pub fn new(options: StoreOptions) -> Self {
        Self { options }
    }

    async fn open(&self) -> Result<Store, StoreError> {
        Store::open(self.options.clone()).await
    }
}

#[async_trait]
impl AnnotationStorage for LocalStorage {
    async fn save_pdf(&self, path: &Path, id: &str) -> Result<(), StoreError> {
        let store = self.open().await?;
        let result = PdfRepository::new(&store).save(path, id).await;
        store.close().await;
        result
    }

    async fn get_pdf(&self, id: &str) -> Result<StoredPdf, StoreError> {
        let store = self.open().await?;
        let result = PdfRepository::new(&store).get(id).await;
        store.close().await;
        result
    }

    async fn delete_pdf(&self, id: &str) -> Result<bool, StoreError> {
        let store = self.open().await?;
        let result = PdfRepository::new(&store).delete(id).await;
        store.close().await;
        result
    }

    async fn save_highlight(&self, highlight: &Highlight) -> Result<(), StoreError> {
        let store = self.open().await?;
        let result = HighlightRepository::new(&store).save(highlight).await;
        store.close().await;
        result
    }

    async fn save_bulk_highlights(&self, highlights: &[Highlight]) -> Result<(), StoreError> {
        let store = self.open().await?;
        let result = HighlightRepository::new(&store).save_bulk(highlights).await;
        store.close().await;
        result
    }

    async fn highlights_for_pdf(&self, pdf_id: &str) -> Result<Vec<Highlight>, StoreError> {
        let store = self.open().await?;
        let result = HighlightRepository::new(&store).list_for_pdf(pdf_id).await;
        store.close().await;
        result
    }

    async fn delete_highlight(&self, pdf_id: &str, id: &str) -> Result<bool, StoreError> {
        let store = self.open().await?;
        let result = HighlightRepository::new(&store).delete(pdf_id, id).await;
        store.close().await;
        result
    }
}
