use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use sumii_core::config::{ALLOWED_DOCUMENT_MIME_TYPES, MAX_DOCUMENT_BYTES};
use sumii_db::models::{Document, OcrStatus};

use crate::app::AppState;
use crate::auth::require_user;
use crate::respond::ApiError;

#[derive(Debug, Deserialize)]
pub struct PatchDocumentRequest {
    pub filename: Option<String>,
}

/// POST /api/v1/documents — multipart upload. Expects a `conversation_id`
/// text field and a `file` field. Runs OCR synchronously for documents
/// whose MIME type supports extraction; failures never fail
/// the upload itself.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<Document>, ApiError> {
    let user_id = require_user(&headers, &state.config.gateway.jwt_secret)?;

    let mut conversation_id: Option<String> = None;
    let mut filename: Option<String> = None;
    let mut mime_type: Option<String> = None;
    let mut bytes: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        sumii_core::SumiiError::InvalidInput(format!("malformed multipart body: {e}"))
    })? {
        match field.name() {
            Some("conversation_id") => {
                conversation_id = Some(field.text().await.unwrap_or_default());
            }
            Some("file") => {
                filename = field.file_name().map(str::to_string);
                mime_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| sumii_core::SumiiError::InvalidInput(format!("failed to read upload: {e}")))?;
                if data.len() as u64 > MAX_DOCUMENT_BYTES {
                    return Err(sumii_core::SumiiError::InvalidInput(format!(
                        "upload exceeds {MAX_DOCUMENT_BYTES} byte limit"
                    ))
                    .into());
                }
                bytes = Some(data.to_vec());
            }
            _ => {}
        }
    }

    let conversation_id = conversation_id
        .ok_or_else(|| sumii_core::SumiiError::InvalidInput("missing conversation_id field".into()))?;
    let filename = filename.unwrap_or_else(|| "upload.bin".to_string());
    let mime_type = mime_type.unwrap_or_else(|| "application/octet-stream".to_string());
    let bytes = bytes.ok_or_else(|| sumii_core::SumiiError::InvalidInput("missing file field".into()))?;

    if !ALLOWED_DOCUMENT_MIME_TYPES.contains(&mime_type.as_str()) {
        return Err(sumii_core::SumiiError::InvalidInput(format!(
            "invalid file type: {mime_type}. allowed: {}",
            ALLOWED_DOCUMENT_MIME_TYPES.join(", ")
        ))
        .into());
    }

    state.db.get_conversation(&conversation_id, &user_id)?;

    let ocr_requested = mime_type.starts_with("image/") || mime_type == "application/pdf";
    let document = state.db.insert_document(&user_id, &conversation_id, &filename, &mime_type, bytes.len() as i64, ocr_requested)?;

    let blob_key = sumii_blob::keys::document_key(&user_id, &conversation_id, &document.id, &filename);
    match state.blob.put(&blob_key, bytes.clone(), &mime_type).await {
        Ok(()) => {
            let download_url = state
                .blob
                .presigned_url(&blob_key, std::time::Duration::from_secs(7 * 24 * 3600))
                .await
                .unwrap_or_default();
            state.db.mark_upload_completed(&document.id, &blob_key, &download_url)?;
        }
        Err(err) => {
            tracing::warn!(%err, document_id = %document.id, "blob upload failed");
            state.db.mark_upload_failed(&document.id)?;
            return Ok(Json(state.db.get_document(&document.id, &user_id)?));
        }
    }

    if ocr_requested {
        let text = state.ocr.extract_text(&bytes, &mime_type, &filename).await;
        let status = if text.is_empty() { OcrStatus::Failed } else { OcrStatus::Completed };
        let extracted = if text.is_empty() { None } else { Some(text.as_str()) };
        state.db.set_ocr_result(&document.id, extracted, status)?;
    }

    Ok(Json(state.db.get_document(&document.id, &user_id)?))
}

pub async fn get_one(State(state): State<Arc<AppState>>, headers: HeaderMap, Path(id): Path<String>) -> Result<Json<Document>, ApiError> {
    let user_id = require_user(&headers, &state.config.gateway.jwt_secret)?;
    Ok(Json(state.db.get_document(&id, &user_id)?))
}

pub async fn list_for_conversation(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(conversation_id): Path<String>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let user_id = require_user(&headers, &state.config.gateway.jwt_secret)?;
    state.db.get_conversation(&conversation_id, &user_id)?;
    Ok(Json(state.db.list_documents_for_conversation(&conversation_id)?))
}

pub async fn patch(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<PatchDocumentRequest>,
) -> Result<Json<Document>, ApiError> {
    let user_id = require_user(&headers, &state.config.gateway.jwt_secret)?;
    state.db.get_document(&id, &user_id)?;
    Ok(Json(state.db.patch_document(&id, req.filename.as_deref())?))
}

pub async fn delete_one(State(state): State<Arc<AppState>>, headers: HeaderMap, Path(id): Path<String>) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = require_user(&headers, &state.config.gateway.jwt_secret)?;
    state.db.get_document(&id, &user_id)?;
    state.db.delete_document(&id)?;
    Ok(Json(serde_json::json!({"status": "deleted"})))
}
