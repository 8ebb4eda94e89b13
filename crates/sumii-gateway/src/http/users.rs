use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use sumii_db::models::User;

use crate::app::AppState;
use crate::auth::require_user;
use crate::respond::ApiError;

#[derive(Debug, Deserialize)]
pub struct SetPushTokenRequest {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub timezone: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

pub async fn get_profile(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Json<User>, ApiError> {
    let user_id = require_user(&headers, &state.config.gateway.jwt_secret)?;
    let user = state
        .db
        .get_user(&user_id)?
        .ok_or_else(|| sumii_core::SumiiError::NotFound(format!("user {user_id}")))?;
    Ok(Json(user))
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<User>, ApiError> {
    let user_id = require_user(&headers, &state.config.gateway.jwt_secret)?;
    let user = state.db.update_profile(
        &user_id,
        req.name.as_deref(),
        req.address.as_deref(),
        req.timezone.as_deref(),
        req.latitude,
        req.longitude,
    )?;
    Ok(Json(user))
}

pub async fn set_push_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<SetPushTokenRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = require_user(&headers, &state.config.gateway.jwt_secret)?;
    state.db.set_push_token(&user_id, &req.token)?;
    Ok(Json(serde_json::json!({"status": "ok"})))
}
