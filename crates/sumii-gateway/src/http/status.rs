use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::auth::require_user;
use crate::respond::ApiError;

/// GET /api/v1/status — coarse readiness check of each boundary adapter,
/// distinct from `/health`'s plain liveness probe.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<Value> {
    let db_ok = state.db.list_conversations("status-check-nonexistent-user").is_ok();
    Json(json!({
        "database": db_ok,
        "agent_configured": state.config.agent.api_key.is_some(),
        "ocr_configured": state.config.ocr.api_key.is_some(),
        "blob_configured": state.config.blob.endpoint_url.is_some() || std::env::var("AWS_ACCESS_KEY_ID").is_ok(),
        "email_configured": state.config.email.smtp_host.is_some(),
        "anwalt_configured": state.config.anwalt.base_url.is_some(),
    }))
}

/// GET /api/v1/status/agents — the known agent roster, driven by config
/// rather than a hardcoded list since the remote library defines the
/// actual agents.
pub async fn agents(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "initial_agent": state.config.agent.initial_agent,
        "wrapup_label_contains": state.config.agent.wrapup_label_contains,
    }))
}

#[derive(Debug, Serialize)]
pub struct ConversationProgress {
    pub who_collected: bool,
    pub what_collected: bool,
    pub when_collected: bool,
    pub where_collected: bool,
    pub why_collected: bool,
    pub analysis_done: bool,
    pub summary_generated: bool,
    pub wrapup_confirmed: bool,
    pub current_agent: String,
    pub status: sumii_db::models::ConversationStatus,
}

pub async fn conversation_progress(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ConversationProgress>, ApiError> {
    let user_id = require_user(&headers, &state.config.gateway.jwt_secret)?;
    let conversation = state.db.get_conversation(&id, &user_id)?;
    Ok(Json(ConversationProgress {
        who_collected: conversation.five_w.who.is_some(),
        what_collected: conversation.five_w.what.is_some(),
        when_collected: conversation.five_w.when.is_some(),
        where_collected: conversation.five_w.where_.is_some(),
        why_collected: conversation.five_w.why.is_some(),
        analysis_done: conversation.analysis_done,
        summary_generated: conversation.summary_generated,
        wrapup_confirmed: conversation.wrapup_confirmed,
        current_agent: conversation.current_agent,
        status: conversation.status,
    }))
}
