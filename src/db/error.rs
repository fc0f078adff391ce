//! Storage engine error types

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Schema migration failure, memoized by the barrier.
///
/// Clonable so that every waiter on the one-shot barrier observes the same
/// failure for the lifetime of the store instance.
#[derive(Debug, Clone, Error)]
#[error("schema migration failed: {message}")]
pub struct SchemaError {
    message: Arc<str>,
}

impl SchemaError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into().into(),
        }
    }
}

/// Errors surfaced by the storage engine.
///
/// Every failure condition is distinguishable; the engine never retries and
/// never swallows an error beyond logging it.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Table creation failed. Fatal for the store instance: every
    /// subsequent operation reports the same condition.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// No PDF row for the requested id.
    #[error("pdf not found: {id}")]
    PdfNotFound { id: String },

    /// A single-row statement failed to execute.
    #[error("write failed: {0}")]
    Write(#[source] sqlx::Error),

    /// A row in a bulk write failed; the whole batch was rolled back.
    #[error("bulk write failed, batch rolled back: {0}")]
    Transaction(#[source] sqlx::Error),

    /// The source file for a PDF save could not be read. Surfaced before
    /// any database write is attempted.
    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stored PDF payload was not valid base64.
    #[error("stored pdf payload is corrupt: {0}")]
    Decode(#[from] base64::DecodeError),

    /// A configured table name is not a bare SQL identifier.
    #[error("invalid table name: {0:?}")]
    InvalidTableName(String),

    /// The database could not be opened.
    #[error("failed to open database: {0}")]
    Open(#[source] sqlx::Error),

    /// Any other driver-level failure (reads, connection handling).
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
