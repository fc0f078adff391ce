//! PDF storage API endpoints

use std::path::PathBuf;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::codec;
use crate::error::Result;
use crate::state::AppState;

/// Save request: the server reads the file at `path` and stores it under
/// `id`. The path may carry the client's `__pdf` suffix form.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePdfRequest {
    pub id: String,
    pub path: PathBuf,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePdfResponse {
    pub id: String,
}

/// Full PDF response; `data` is the base64 payload.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfResponse {
    pub id: String,
    pub filename: String,
    pub data: String,
}

/// Create the PDF router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(save_pdf))
        .route("/:id", get(get_pdf))
        .route("/:id", delete(delete_pdf))
}

/// Save (or replace) a PDF
async fn save_pdf(
    State(state): State<AppState>,
    Json(req): Json<SavePdfRequest>,
) -> Result<Json<SavePdfResponse>> {
    state.storage().save_pdf(&req.path, &req.id).await?;
    Ok(Json(SavePdfResponse { id: req.id }))
}

/// Fetch a PDF with its payload
async fn get_pdf(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PdfResponse>> {
    let stored = state.storage().get_pdf(&id).await?;
    Ok(Json(PdfResponse {
        id: stored.id,
        filename: stored.filename,
        data: codec::encode(&stored.data),
    }))
}

/// Delete a PDF; deleting an unknown id is a silent success
async fn delete_pdf(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    let existed = state.storage().delete_pdf(&id).await?;
    if !existed {
        tracing::debug!("delete for unknown pdf {id}");
    }
    Ok(StatusCode::NO_CONTENT)
}
