use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use sumii_artifact::SummaryMetadata;
use sumii_db::models::Summary;

use crate::app::AppState;
use crate::auth::require_user;
use crate::respond::ApiError;

#[derive(Debug, Deserialize)]
pub struct GenerateSummaryRequest {
    pub conversation_id: String,
    pub markdown: String,
    #[serde(default)]
    pub legal_area: Option<String>,
    #[serde(default)]
    pub case_strength: Option<String>,
    #[serde(default)]
    pub urgency: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PatchSummaryRequest {
    pub legal_area: Option<String>,
    pub case_strength: Option<String>,
    pub urgency: Option<String>,
}

/// POST /api/v1/summaries — idempotent per conversation. Mainly
/// used by scripted flows/tests; the chat path triggers generation through
/// the `generate_summary` function-call interception in §4.1 instead.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<GenerateSummaryRequest>,
) -> Result<Json<Summary>, ApiError> {
    let user_id = require_user(&headers, &state.config.gateway.jwt_secret)?;
    state.db.get_conversation(&req.conversation_id, &user_id)?;
    let summary = state
        .turn
        .summaries
        .finalize(
            &req.conversation_id,
            &user_id,
            &req.markdown,
            SummaryMetadata { legal_area: req.legal_area, case_strength: req.case_strength, urgency: req.urgency },
        )
        .await
        .map_err(sumii_core::SumiiError::from)?;
    Ok(Json(summary))
}

pub async fn list(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Json<Vec<Summary>>, ApiError> {
    let user_id = require_user(&headers, &state.config.gateway.jwt_secret)?;
    Ok(Json(state.db.list_summaries(&user_id)?))
}

pub async fn get_one(State(state): State<Arc<AppState>>, headers: HeaderMap, Path(id): Path<String>) -> Result<Json<Summary>, ApiError> {
    let user_id = require_user(&headers, &state.config.gateway.jwt_secret)?;
    Ok(Json(state.db.get_summary(&id, &user_id)?))
}

pub async fn get_for_conversation(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(conversation_id): Path<String>,
) -> Result<Json<Option<Summary>>, ApiError> {
    let user_id = require_user(&headers, &state.config.gateway.jwt_secret)?;
    state.db.get_conversation(&conversation_id, &user_id)?;
    Ok(Json(state.db.get_summary_by_conversation(&conversation_id)?))
}

pub async fn pdf_url(State(state): State<Arc<AppState>>, headers: HeaderMap, Path(id): Path<String>) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = require_user(&headers, &state.config.gateway.jwt_secret)?;
    let summary = state.db.get_summary(&id, &user_id)?;
    Ok(Json(serde_json::json!({ "pdf_url": summary.pdf_url })))
}

pub async fn patch(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<PatchSummaryRequest>,
) -> Result<Json<Summary>, ApiError> {
    let user_id = require_user(&headers, &state.config.gateway.jwt_secret)?;
    state.db.get_summary(&id, &user_id)?;
    Ok(Json(state.db.patch_summary(&id, req.legal_area.as_deref(), req.case_strength.as_deref(), req.urgency.as_deref())?))
}

pub async fn delete_one(State(state): State<Arc<AppState>>, headers: HeaderMap, Path(id): Path<String>) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = require_user(&headers, &state.config.gateway.jwt_secret)?;
    state.db.get_summary(&id, &user_id)?;
    state.db.delete_summary(&id)?;
    Ok(Json(serde_json::json!({"status": "deleted"})))
}

pub async fn regenerate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Summary>, ApiError> {
    let user_id = require_user(&headers, &state.config.gateway.jwt_secret)?;
    let existing = state.db.get_summary(&id, &user_id)?;
    let summary = state.turn.summaries.regenerate(&id, &existing.markdown).await.map_err(sumii_core::SumiiError::from)?;
    Ok(Json(summary))
}
