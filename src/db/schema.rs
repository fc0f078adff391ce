//! Database schema initialization
//!
//! Table creation runs once per store instance, in a task spawned at
//! construction. [`SchemaBarrier`] is the one-shot gate every data
//! operation passes through before touching either table.

use std::future::Future;

use futures::future::{BoxFuture, FutureExt, Shared};
use sqlx::SqlitePool;

use super::error::SchemaError;
use super::TableNames;

/// One-shot completion gate for schema migration.
///
/// The migration future is spawned exactly once; its outcome is memoized,
/// so repeated waits after the first completion return immediately without
/// re-running table creation. A failed migration is permanent for the
/// owning store instance.
#[derive(Clone)]
pub struct SchemaBarrier {
    ready: Shared<BoxFuture<'static, Result<(), SchemaError>>>,
}

impl SchemaBarrier {
    /// Start the migration immediately and return the gate for it.
    pub fn spawn<F>(migration: F) -> Self
    where
        F: Future<Output = Result<(), sqlx::Error>> + Send + 'static,
    {
        let handle = tokio::spawn(migration);
        let ready = async move {
            match handle.await {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => {
                    tracing::error!("schema migration failed: {e}");
                    Err(SchemaError::new(e.to_string()))
                }
                Err(e) => {
                    tracing::error!("schema migration task aborted: {e}");
                    Err(SchemaError::new(format!("migration task aborted: {e}")))
                }
            }
        }
        .boxed()
        .shared();

        Self { ready }
    }

    /// Wait for migration to complete.
    ///
    /// Safe to await from any number of concurrent callers; table creation
    /// still runs exactly once.
    pub async fn wait(&self) -> Result<(), SchemaError> {
        self.ready.clone().await
    }
}

/// Create both tables if absent.
pub(crate) async fn initialize_schema(
    pool: SqlitePool,
    tables: TableNames,
) -> Result<(), sqlx::Error> {
    sqlx::query(&schema_sql(&tables)).execute(&pool).await?;
    tracing::debug!(
        "schema ready (tables {}, {})",
        tables.pdfs,
        tables.highlights
    );
    Ok(())
}

fn schema_sql(tables: &TableNames) -> String {
    format!(
        r#"
-- PDF payloads (filedata holds the base64 text encoding of the file)
CREATE TABLE IF NOT EXISTS {pdfs} (
    id TEXT PRIMARY KEY,
    filename TEXT,
    filedata TEXT
);

-- Page-region highlights, keyed per PDF
CREATE TABLE IF NOT EXISTS {highlights} (
    id TEXT,
    pdfId TEXT,
    pageNumber INTEGER NOT NULL,
    x1 REAL NOT NULL,
    y1 REAL NOT NULL,
    x2 REAL NOT NULL,
    y2 REAL NOT NULL,
    width REAL,
    height REAL,
    text TEXT,
    image TEXT,
    keyword TEXT,
    PRIMARY KEY (id, pdfId)
);

CREATE INDEX IF NOT EXISTS idx_{highlights}_pdfId ON {highlights}(pdfId);
"#,
        pdfs = tables.pdfs,
        highlights = tables.highlights,
    )
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn migration_runs_exactly_once_under_concurrent_waits() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let barrier = SchemaBarrier::spawn(async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let (a, b, c) = tokio::join!(barrier.wait(), barrier.wait(), barrier.wait());
        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        // Waits after completion return immediately, still without re-running.
        barrier.wait().await.unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failure_is_memoized_for_every_waiter() {
        let barrier = SchemaBarrier::spawn(async { Err(sqlx::Error::PoolClosed) });

        let first = barrier.wait().await.unwrap_err();
        let second = barrier.wait().await.unwrap_err();
        assert_eq!(first.to_string(), second.to_string());
    }
}
