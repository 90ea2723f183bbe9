//! Upload listing and deletion endpoints

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::{UploadRecord, UploadRepository};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Pagination query parameters
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

/// Response for the uploads listing
#[derive(Serialize)]
pub struct UploadsResponse {
    pub uploads: Vec<UploadEntry>,
}

/// One listed upload
#[derive(Serialize)]
pub struct UploadEntry {
    pub upload_time: String,
    pub filename: String,
    pub hostname: String,
    pub file_hash: String,
}

impl From<UploadRecord> for UploadEntry {
    fn from(record: UploadRecord) -> Self {
        Self {
            upload_time: record.upload_time,
            filename: record.filename,
            hostname: record.hostname,
            file_hash: record.file_hash,
        }
    }
}

/// Response for a successful deletion
#[derive(Serialize)]
pub struct DeleteResponse {
    pub status: &'static str,
    pub message: String,
}

/// Create the uploads router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/uploads", get(list_uploads))
        .route("/uploads/:file_hash", delete(delete_upload))
}

/// List registered uploads, newest first
async fn list_uploads(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<UploadsResponse>> {
    if params.limit < 1 {
        return Err(AppError::BadRequest("limit must be at least 1".to_string()));
    }
    if params.offset < 0 {
        return Err(AppError::BadRequest("offset must not be negative".to_string()));
    }

    let repo = UploadRepository::new(state.db());
    let records = repo.list(params.limit, params.offset).await?;

    Ok(Json(UploadsResponse {
        uploads: records.into_iter().map(UploadEntry::from).collect(),
    }))
}

/// Delete every record matching a hash
async fn delete_upload(
    State(state): State<AppState>,
    Path(file_hash): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let repo = UploadRepository::new(state.db());
    let removed = repo.delete_by_hash(&file_hash).await?;

    if removed == 0 {
        return Err(AppError::NotFound("record not found".to_string()));
    }

    tracing::info!(hash = %file_hash, removed, "Deleted upload records");

    Ok(Json(DeleteResponse {
        status: "success",
        message: "record deleted".to_string(),
    }))
}
