//! Hash verification endpoints
//!
//! `/verify` checks one file against a caller-claimed hash and against the
//! registry; `/verify-multi` checks a batch against the registry only.
//! Neither endpoint writes anything.

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::db::UploadRepository;
use crate::error::{AppError, Result};
use crate::hashing::FileHasher;
use crate::routes::hash::MAX_BATCH_FILES;
use crate::state::AppState;

/// Response for single-file verification
#[derive(Serialize)]
pub struct VerifyResponse {
    pub message: String,
}

/// Response for batch verification
#[derive(Serialize)]
pub struct VerifyMultiResponse {
    pub results: Vec<VerifyMultiResult>,
}

/// Registry lookup outcome for one file
#[derive(Serialize)]
pub struct VerifyMultiResult {
    pub filename: String,
    pub found: bool,
    /// Name the content was originally registered under; present only
    /// when found, and may differ from `filename` for renamed files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_filename: Option<String>,
}

/// Create the verify router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/verify", post(verify_file))
        .route("/verify-multi", post(verify_multi))
}

/// Verify one file against a claimed hash and the registry
///
/// The registry lookup uses the server-computed hash, not the claimed
/// one, so a wrong claim still reports whether the content is known.
async fn verify_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<VerifyResponse>> {
    let mut claimed: Option<String> = None;
    let mut computed: Option<String> = None;

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let mut hasher = FileHasher::new();
                while let Some(chunk) = field.chunk().await? {
                    hasher.update(&chunk);
                }
                computed = Some(hasher.finalize_hex());
            }
            "hash" => {
                claimed = Some(field.text().await?);
            }
            _ => {}
        }
    }

    let computed =
        computed.ok_or_else(|| AppError::BadRequest("missing multipart field: file".to_string()))?;
    let claimed =
        claimed.ok_or_else(|| AppError::BadRequest("missing form field: hash".to_string()))?;

    let repo = UploadRepository::new(state.db());
    let found = repo.exists(&computed).await?;

    let registry_part = if found {
        "Hash found in registry."
    } else {
        "Hash not found in registry."
    };

    let message = if computed.eq_ignore_ascii_case(&claimed) {
        format!("Hash matches (verified on server). {registry_part}")
    } else {
        format!("Hash does not match. {registry_part}")
    };

    tracing::debug!(hash = %computed, found, "Verified file");

    Ok(Json(VerifyResponse { message }))
}

/// Look up a batch of files in the registry by content
async fn verify_multi(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<VerifyMultiResponse>> {
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

        let db_filename = repo.find_one_by_hash(&hash).await?;
        results.push(VerifyMultiResult {
            filename,
            found: db_filename.is_some(),
            db_filename,
        });
    }

    if results.is_empty() {
        return Err(AppError::BadRequest(
            "missing multipart field: files".to_string(),
        ));
    }

    Ok(Json(VerifyMultiResponse { results }))
}
