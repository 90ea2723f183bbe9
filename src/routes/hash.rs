//! Batch hash-and-register endpoint
//!
//! Accepts up to [`MAX_BATCH_FILES`] files per request, hashes each one,
//! and records hashes the registry has not seen before. All files in one
//! request share a single timestamp and client host.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Multipart, State},
    routing::post,
    Json, Router,
};
use chrono::Local;
use serde::Serialize;

use crate::db::UploadRepository;
use crate::error::{AppError, Result};
use crate::hashing::FileHasher;
use crate::state::AppState;

/// Files beyond this count in a single request are silently ignored.
pub const MAX_BATCH_FILES: usize = 10;

/// Response for a hash batch
#[derive(Serialize)]
pub struct HashResponse {
    pub results: Vec<HashResult>,
}

/// Outcome for one file, in upload order
#[derive(Serialize)]
pub struct HashResult {
    pub filename: String,
    pub hash: String,
    pub exists: bool,
}

/// Create the hash router
pub fn router() -> Router<AppState> {
    Router::new().route("/hash", post(hash_files))
}

/// Hash each uploaded file and register hashes not seen before
async fn hash_files(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    mut multipart: Multipart,
) -> Result<Json<HashResponse>> {
    let hostname = connect_info
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    // One timestamp for the whole batch
    let upload_time = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    let repo = UploadRepository::new(state.db());
    let mut results = Vec::new();

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        if name != "files" {
            continue;
        }
        if results.len() >= MAX_BATCH_FILES {
            break;
        }

        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let mut hasher = FileHasher::new();
        while let Some(chunk) = field.chunk().await? {
            hasher.update(&chunk);
        }
        let hash = hasher.finalize_hex();

        let exists = repo.exists(&hash).await?;
        if !exists {
            repo.insert(&filename, &upload_time, &hostname, &hash).await?;
            tracing::debug!(filename = %filename, hash = %hash, "Registered new upload");
        }

        results.push(HashResult {
            filename,
            hash,
            exists,
        });
    }

    if results.is_empty() {
        return Err(AppError::BadRequest(
            "missing multipart field: files".to_string(),
        ));
    }

    tracing::info!(count = results.len(), hostname = %hostname, "Processed hash batch");

    Ok(Json(HashResponse { results }))
}
