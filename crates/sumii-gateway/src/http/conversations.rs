use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use sumii_db::models::{Conversation, ConversationStatus, Message};

use crate::app::AppState;
use crate::auth::require_user;
use crate::respond::ApiError;

#[derive(Debug, Deserialize)]
pub struct CreateConversationRequest {
    #[serde(default = "default_title")]
    pub title: String,
}

fn default_title() -> String {
    "Neue Unterhaltung".to_string()
}

#[derive(Debug, Serialize)]
pub struct ConversationWithMessages {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
pub struct PatchConversationRequest {
    pub title: Option<String>,
    pub status: Option<ConversationStatus>,
}

pub async fn list(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Json<Vec<Conversation>>, ApiError> {
    let user_id = require_user(&headers, &state.config.gateway.jwt_secret)?;
    Ok(Json(state.db.list_conversations(&user_id)?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateConversationRequest>,
) -> Result<Json<Conversation>, ApiError> {
    let user_id = require_user(&headers, &state.config.gateway.jwt_secret)?;
    let conversation = state.db.create_conversation(&user_id, &req.title, &state.config.agent.initial_agent)?;
    Ok(Json(conversation))
}

pub async fn get_one(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ConversationWithMessages>, ApiError> {
    let user_id = require_user(&headers, &state.config.gateway.jwt_secret)?;
    let conversation = state.db.get_conversation(&id, &user_id)?;
    let messages = state.db.list_messages(&id)?;
    Ok(Json(ConversationWithMessages { conversation, messages }))
}

pub async fn patch(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<PatchConversationRequest>,
) -> Result<Json<Conversation>, ApiError> {
    let user_id = require_user(&headers, &state.config.gateway.jwt_secret)?;
    state.db.get_conversation(&id, &user_id)?;
    let conversation = state.db.patch_conversation(&id, req.title.as_deref(), req.status.as_ref())?;
    Ok(Json(conversation))
}

pub async fn delete_one(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = require_user(&headers, &state.config.gateway.jwt_secret)?;
    state.db.get_conversation(&id, &user_id)?;
    state.db.delete_conversation(&id)?;
    Ok(Json(serde_json::json!({"status": "deleted"})))
}
