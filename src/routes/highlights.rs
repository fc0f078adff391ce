//! Highlight API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::Highlight;
use crate::error::Result;
use crate::state::AppState;

/// Save request; a missing id gets a server-generated UUID.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveHighlight {
    pub id: Option<String>,
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

impl SaveHighlight {
    fn into_highlight(self) -> Highlight {
        Highlight {
            id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            pdf_id: self.pdf_id,
            page_number: self.page_number,
            x1: self.x1,
            y1: self.y1,
            x2: self.x2,
            y2: self.y2,
            width: self.width,
            height: self.height,
            text: self.text,
            image: self.image,
            keyword: self.keyword,
        }
    }
}

/// Create the highlights router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(save_highlight))
        .route("/bulk", post(save_bulk_highlights))
        .route("/pdf/:pdf_id", get(list_for_pdf))
        .route("/pdf/:pdf_id/:id", delete(delete_highlight))
}

/// Save (or replace) one highlight
async fn save_highlight(
    State(state): State<AppState>,
    Json(data): Json<SaveHighlight>,
) -> Result<(StatusCode, Json<Highlight>)> {
    let highlight = data.into_highlight();
    state.storage().save_highlight(&highlight).await?;
    Ok((StatusCode::CREATED, Json(highlight)))
}

/// Save a batch of highlights atomically
async fn save_bulk_highlights(
    State(state): State<AppState>,
    Json(data): Json<Vec<SaveHighlight>>,
) -> Result<Json<serde_json::Value>> {
    let highlights: Vec<Highlight> = data.into_iter().map(SaveHighlight::into_highlight).collect();
    state.storage().save_bulk_highlights(&highlights).await?;
    Ok(Json(serde_json::json!({ "saved": highlights.len() })))
}

/// List every highlight for a PDF
async fn list_for_pdf(
    State(state): State<AppState>,
    Path(pdf_id): Path<String>,
) -> Result<Json<Vec<Highlight>>> {
    let highlights = state.storage().highlights_for_pdf(&pdf_id).await?;
    Ok(Json(highlights))
}

/// Delete one highlight; an unknown key is a silent success
async fn delete_highlight(
    State(state): State<AppState>,
    Path((pdf_id, id)): Path<(String, String)>,
) -> Result<StatusCode> {
    let existed = state.storage().delete_highlight(&pdf_id, &id).await?;
    if !existed {
        tracing::debug!("delete for unknown highlight {pdf_id}/{id}");
    }
    Ok(StatusCode::NO_CONTENT)
}
