//! PDF payload persistence

use std::path::{Path, PathBuf};

use super::codec;
use super::{Store, StoreError};

/// A stored PDF, payload already decoded back to raw bytes.
#[derive(Debug, Clone)]
pub struct StoredPdf {
    pub id: String,
    pub filename: String,
    pub data: Vec<u8>,
}

/// PDF repository
pub struct PdfRepository<'a> {
    store: &'a Store,
}

impl<'a> PdfRepository<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Save the file at `path` under `id`, replacing any existing row.
    ///
    /// A literal `__pdf` trailing suffix is rewritten to `.pdf` before the
    /// read; callers may pass either form. The stored filename is the
    /// basename of the corrected path.
    pub async fn save(&self, path: &Path, id: &str) -> Result<(), StoreError> {
        self.store.ready().await?;

        let path = normalize_suffix(path);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| StoreError::FileRead {
                path: path.clone(),
                source,
            })?;
        let filename = basename(&path);
        let filedata = codec::encode(&bytes);

        let sql = format!(
            "INSERT INTO {} (id, filename, filedata) VALUES (?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET \
                 filename = excluded.filename, \
                 filedata = excluded.filedata",
            self.store.tables().pdfs
        );
        sqlx::query(&sql)
            .bind(id)
            .bind(&filename)
            .bind(&filedata)
            .execute(self.store.pool())
            .await
            .map_err(StoreError::Write)?;

        tracing::debug!("saved pdf {id} ({} bytes) as {filename}", bytes.len());
        Ok(())
    }

    /// Fetch a PDF by id, decoding the payload.
    ///
    /// An absent id is an error, never an empty placeholder.
    pub async fn get(&self, id: &str) -> Result<StoredPdf, StoreError> {
        self.store.ready().await?;

        let sql = format!(
            "SELECT id, filename, filedata FROM {} WHERE id = ?",
            self.store.tables().pdfs
        );
        let row: Option<(String, Option<String>, Option<String>)> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.store.pool())
            .await?;

        let (id, filename, filedata) = row.ok_or_else(|| StoreError::PdfNotFound {
            id: id.to_string(),
        })?;
        let data = codec::decode(filedata.as_deref().unwrap_or_default())?;

        Ok(StoredPdf {
            id,
            filename: filename.unwrap_or_default(),
            data,
        })
    }

    /// Delete a PDF by id.
    ///
    /// Deleting an id that was never saved affects zero rows and is not an
    /// error; the return value reports whether a row existed.
    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        self.store.ready().await?;

        let sql = format!("DELETE FROM {} WHERE id = ?", self.store.tables().pdfs);
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(self.store.pool())
            .await
            .map_err(StoreError::Write)?;

        Ok(result.rows_affected() > 0)
    }
}

fn normalize_suffix(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) if s.ends_with("__pdf") => {
            PathBuf::from(format!("{}.pdf", &s[..s.len() - "__pdf".len()]))
        }
        _ => path.to_path_buf(),
    }
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
