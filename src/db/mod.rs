//! SQLite storage engine for PDF payloads and highlights
//!
//! A [`Store`] owns exactly one database connection for its lifetime.
//! Construction starts schema migration without blocking; every repository
//! call waits on the migration barrier before issuing statements.

pub mod codec;
mod error;
mod highlights;
mod pdfs;
mod schema;

pub use error::*;
pub use highlights::*;
pub use pdfs::*;
pub use schema::SchemaBarrier;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

/// Names of the two tables, injectable for test isolation.
#[derive(Debug, Clone)]
pub struct TableNames {
    pub highlights: String,
    pub pdfs: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            highlights: "highlights".to_string(),
            pdfs: "pdfs".to_string(),
        }
    }
}

/// Connection options for a [`Store`].
#[derive(Debug, Clone)]
pub struct StoreOptions {
    url: String,
    tables: TableNames,
}

impl StoreOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            tables: TableNames::default(),
        }
    }

    /// A private in-memory database, gone when the store closes.
    pub fn in_memory() -> Self {
        Self::new("sqlite::memory:")
    }

    pub fn with_highlights_table(mut self, name: impl Into<String>) -> Self {
        self.tables.highlights = name.into();
        self
    }

    pub fn with_pdfs_table(mut self, name: impl Into<String>) -> Self {
        self.tables.pdfs = name.into();
        self
    }
}

/// The storage engine: one connection, two tables, a migration barrier.
pub struct Store {
    pool: SqlitePool,
    tables: TableNames,
    schema: SchemaBarrier,
}

impl Store {
    /// Open the database and start schema migration.
    ///
    /// Migration runs in a spawned task; the constructor does not wait for
    /// it. Operations (and [`Store::close`]) wait on the barrier instead.
    pub async fn open(options: StoreOptions) -> Result<Self, StoreError> {
        for name in [&options.tables.highlights, &options.tables.pdfs] {
            // Table names are formatted into SQL, so only bare identifiers
            // are accepted.
            if !is_bare_identifier(name) {
                return Err(StoreError::InvalidTableName(name.clone()));
            }
        }

        let connect = SqliteConnectOptions::from_str(&options.url)
            .map_err(StoreError::Open)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        // One connection, never recycled: callers get the statement queue's
        // serialization and nothing more.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(connect)
            .await
            .map_err(StoreError::Open)?;

        let schema = SchemaBarrier::spawn(schema::initialize_schema(
            pool.clone(),
            options.tables.clone(),
        ));
        tracing::debug!("connected to highlights db at {}", options.url);

        Ok(Self {
            pool,
            tables: options.tables,
            schema,
        })
    }

    /// Wait until the schema exists.
    ///
    /// A no-op after the first completion. If migration failed, every call
    /// reports that failure for the lifetime of the instance.
    pub async fn ready(&self) -> Result<(), StoreError> {
        self.schema.wait().await.map_err(StoreError::from)
    }

    /// Release the connection.
    ///
    /// Honors the migration barrier first, so a close requested before
    /// migration finishes does not race table creation. Closing an
    /// already-closed store is a no-op.
    pub async fn close(&self) {
        if let Err(e) = self.schema.wait().await {
            tracing::debug!("closing store whose schema never became ready: {e}");
        }
        self.pool.close().await;
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub(crate) fn tables(&self) -> &TableNames {
        &self.tables
    }
}

fn is_bare_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn close_before_any_operation() {
        let store = Store::open(StoreOptions::in_memory()).await.unwrap();
        store.close().await;
    }

    #[tokio::test]
    async fn double_close_is_a_no_op() {
        let store = Store::open(StoreOptions::in_memory()).await.unwrap();
        store.ready().await.unwrap();
        store.close().await;
        store.close().await;
    }

    #[tokio::test]
    async fn rejects_table_names_that_are_not_identifiers() {
        let options = StoreOptions::in_memory().with_highlights_table("highlights; DROP TABLE pdfs");
        let err = Store::open(options).await.err().expect("open should fail");
        assert!(matches!(err, StoreError::InvalidTableName(_)));
    }

    #[tokio::test]
    async fn custom_table_names_are_used() {
        let options = StoreOptions::in_memory()
            .with_highlights_table("test_highlights")
            .with_pdfs_table("test_pdfs");
        let store = Store::open(options).await.unwrap();
        store.ready().await.unwrap();

        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM test_highlights")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(row.0, 0);
        store.close().await;
    }

    #[tokio::test]
    async fn concurrent_first_operations_share_one_migration() {
        let store = Store::open(StoreOptions::in_memory()).await.unwrap();
        let repo = HighlightRepository::new(&store);

        // Both hit the barrier before the tables exist; neither re-triggers
        // creation and both must succeed.
        let (a, b) = tokio::join!(repo.list_for_pdf("doc-a"), repo.list_for_pdf("doc-b"));
        assert!(a.unwrap().is_empty());
        assert!(b.unwrap().is_empty());
        store.close().await;
    }
}
