//! Highlight database operations

use serde::{Deserialize, Serialize};
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::Sqlite;

use super::{Store, StoreError};

/// A page-region highlight.
///
/// The same highlight id may exist under different PDFs, never twice under
/// the same one: the key is (id, pdfId).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct Highlight {
    pub id: String,
    pub pdf_id: String,
    pub page_number: i64,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub text: Option<String>,
    pub image: Option<String>,
    pub keyword: Option<String>,
}

/// Highlight repository
pub struct HighlightRepository<'a> {
    store: &'a Store,
}

impl<'a> HighlightRepository<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Upsert one highlight, all twelve columns in fixed order.
    pub async fn save(&self, highlight: &Highlight) -> Result<(), StoreError> {
        self.store.ready().await?;

        let sql = self.upsert_sql();
        bind_highlight(sqlx::query(&sql), highlight)
            .execute(self.store.pool())
            .await
            .map_err(StoreError::Write)?;

        Ok(())
    }

    /// Upsert a batch atomically: either every row applies or none do.
    ///
    /// An empty batch is a legal no-op that still succeeds. Any row failure
    /// rolls the whole batch back and is surfaced once for the call.
    pub async fn save_bulk(&self, highlights: &[Highlight]) -> Result<(), StoreError> {
        self.store.ready().await?;
        if highlights.is_empty() {
            return Ok(());
        }

        let sql = self.upsert_sql();
        let mut tx = self
            .store
            .pool()
            .begin()
            .await
            .map_err(StoreError::Transaction)?;

        // One parameterized statement, reused per row through the
        // connection's statement cache. Dropping an uncommitted
        // transaction rolls the batch back.
        for highlight in highlights {
            bind_highlight(sqlx::query(&sql), highlight)
                .execute(&mut *tx)
                .await
                .map_err(StoreError::Transaction)?;
        }
        tx.commit().await.map_err(StoreError::Transaction)?;

        tracing::debug!("saved {} highlights in one batch", highlights.len());
        Ok(())
    }

    /// All highlights for a PDF.
    ///
    /// Row order is unspecified; callers needing a stable order sort on
    /// their side.
    pub async fn list_for_pdf(&self, pdf_id: &str) -> Result<Vec<Highlight>, StoreError> {
        self.store.ready().await?;

        let sql = format!(
            "SELECT id, pdfId, pageNumber, x1, y1, x2, y2, width, height, text, image, keyword \
             FROM {} WHERE pdfId = ?",
            self.store.tables().highlights
        );
        let highlights = sqlx::query_as::<_, Highlight>(&sql)
            .bind(pdf_id)
            .fetch_all(self.store.pool())
            .await?;

        Ok(highlights)
    }

    /// Delete at most one highlight by composite key.
    ///
    /// Deleting a key that was never saved affects zero rows and is not an
    /// error; the return value reports whether a row existed.
    pub async fn delete(&self, pdf_id: &str, id: &str) -> Result<bool, StoreError> {
        self.store.ready().await?;

        let sql = format!(
            "DELETE FROM {} WHERE pdfId = ? AND id = ?",
            self.store.tables().highlights
        );
        let result = sqlx::query(&sql)
            .bind(pdf_id)
            .bind(id)
            .execute(self.store.pool())
            .await
            .map_err(StoreError::Write)?;

        Ok(result.rows_affected() > 0)
    }

    fn upsert_sql(&self) -> String {
        format!(
            "INSERT INTO {} (id, pdfId, pageNumber, x1, y1, x2, y2, width, height, text, image, keyword) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(id, pdfId) DO UPDATE SET \
                 pageNumber = excluded.pageNumber, \
                 x1 = excluded.x1, \
                 y1 = excluded.y1, \
                 x2 = excluded.x2, \
                 y2 = excluded.y2, \
                 width = excluded.width, \
                 height = excluded.height, \
                 text = excluded.text, \
                 image = excluded.image, \
                 keyword = excluded.keyword",
            self.store.tables().highlights
        )
    }
}

fn bind_highlight<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    h: &'q Highlight,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    query
        .bind(&h.id)
        .bind(&h.pdf_id)
        .bind(h.page_number)
        .bind(h.x1)
        .bind(h.y1)
        .bind(h.x2)
        .bind(h.y2)
        .bind(h.width)
        .bind(h.height)
        .bind(&h.text)
        .bind(&h.image)
        .bind(&h.keyword)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::StoreOptions;

    async fn open_store() -> Store {
        Store::open(StoreOptions::in_memory()).await.unwrap()
    }

    fn sample(id: &str, pdf_id: &str) -> Highlight {
        Highlight {
            id: id.to_string(),
            pdf_id: pdf_id.to_string(),
            page_number: 3,
            x1: 10.5,
            y1: 20.0,
            x2: 110.5,
            y2: 40.0,
            width: Some(100.0),
            height: Some(20.0),
            text: Some("highlighted passage".to_string()),
            image: None,
            keyword: Some("methodology".to_string()),
        }
    }

    async fn count(store: &Store) -> i64 {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM highlights")
            .fetch_one(store.pool())
            .await
            .unwrap();
        row.0
    }

    #[tokio::test]
    async fn save_and_list_round_trips_all_fields() {
        let store = open_store().await;
        let repo = HighlightRepository::new(&store);

        let highlight = sample("h1", "doc-a");
        repo.save(&highlight).await.unwrap();

        let listed = repo.list_for_pdf("doc-a").await.unwrap();
        assert_eq!(listed, vec![highlight]);
        store.close().await;
    }

    #[tokio::test]
    async fn same_id_under_different_pdfs_are_independent_rows() {
        let store = open_store().await;
        let repo = HighlightRepository::new(&store);

        let mut under_a = sample("h1", "doc-a");
        under_a.text = Some("from a".to_string());
        let mut under_b = sample("h1", "doc-b");
        under_b.text = Some("from b".to_string());
        repo.save(&under_a).await.unwrap();
        repo.save(&under_b).await.unwrap();

        let listed_a = repo.list_for_pdf("doc-a").await.unwrap();
        let listed_b = repo.list_for_pdf("doc-b").await.unwrap();
        assert_eq!(listed_a, vec![under_a]);
        assert_eq!(listed_b, vec![under_b]);
        store.close().await;
    }

    #[tokio::test]
    async fn saving_the_same_key_twice_replaces_the_row() {
        let store = open_store().await;
        let repo = HighlightRepository::new(&store);

        repo.save(&sample("h1", "doc-a")).await.unwrap();
        let mut updated = sample("h1", "doc-a");
        updated.page_number = 7;
        updated.text = Some("revised".to_string());
        repo.save(&updated).await.unwrap();

        let listed = repo.list_for_pdf("doc-a").await.unwrap();
        assert_eq!(listed, vec![updated]);
        assert_eq!(count(&store).await, 1);
        store.close().await;
    }

    #[tokio::test]
    async fn empty_batch_is_a_no_op() {
        let store = open_store().await;
        let repo = HighlightRepository::new(&store);

        repo.save(&sample("h1", "doc-a")).await.unwrap();
        repo.save_bulk(&[]).await.unwrap();
        assert_eq!(count(&store).await, 1);
        store.close().await;
    }

    #[tokio::test]
    async fn bulk_save_applies_every_row() {
        let store = open_store().await;
        let repo = HighlightRepository::new(&store);

        let batch: Vec<Highlight> = (0..5)
            .map(|i| {
                let mut h = sample(&format!("h{i}"), "doc-a");
                h.page_number = i;
                h.keyword = None;
                h
            })
            .collect();
        repo.save_bulk(&batch).await.unwrap();

        let mut listed = repo.list_for_pdf("doc-a").await.unwrap();
        listed.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(listed, batch);
        store.close().await;
    }

    #[tokio::test]
    async fn failed_batch_leaves_no_rows_behind() {
        let store = open_store().await;
        store.ready().await.unwrap();

        // An extra uniqueness constraint the upsert's conflict target does
        // not cover, so a duplicate keyword fails the statement outright.
        sqlx::query("CREATE UNIQUE INDEX idx_highlights_keyword ON highlights(keyword)")
            .execute(store.pool())
            .await
            .unwrap();

        let repo = HighlightRepository::new(&store);
        let mut batch = vec![
            sample("h1", "doc-a"),
            sample("h2", "doc-a"),
            sample("h3", "doc-a"),
        ];
        batch[0].keyword = Some("alpha".to_string());
        batch[1].keyword = Some("beta".to_string());
        batch[2].keyword = Some("alpha".to_string());

        let err = repo.save_bulk(&batch).await.unwrap_err();
        assert!(matches!(err, StoreError::Transaction(_)));

        // None of the first rows were partially committed.
        assert_eq!(count(&store).await, 0);
        store.close().await;
    }

    #[tokio::test]
    async fn delete_missing_key_is_silent() {
        let store = open_store().await;
        let repo = HighlightRepository::new(&store);

        assert!(!repo.delete("doc-a", "never-saved").await.unwrap());

        repo.save(&sample("h1", "doc-a")).await.unwrap();
        assert!(repo.delete("doc-a", "h1").await.unwrap());
        assert!(repo.list_for_pdf("doc-a").await.unwrap().is_empty());
        store.close().await;
    }

    #[tokio::test]
    async fn delete_only_touches_the_matching_pdf() {
        let store = open_store().await;
        let repo = HighlightRepository::new(&store);

        repo.save(&sample("h1", "doc-a")).await.unwrap();
        repo.save(&sample("h1", "doc-b")).await.unwrap();

        repo.delete("doc-a", "h1").await.unwrap();
        assert!(repo.list_for_pdf("doc-a").await.unwrap().is_empty());
        assert_eq!(repo.list_for_pdf("doc-b").await.unwrap().len(), 1);
        store.close().await;
    }
}
