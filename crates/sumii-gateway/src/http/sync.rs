use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use sumii_protocol::sync::{SyncRequest, SyncResponse};

use crate::app::AppState;
use crate::auth::require_user;
use crate::respond::ApiError;

pub async fn sync(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<SyncRequest>,
) -> Result<Json<SyncResponse>, ApiError> {
    let user_id = require_user(&headers, &state.config.gateway.jwt_secret)?;
    let response = sumii_orchestrator::sync::run(&state.db, &user_id, req).map_err(sumii_core::SumiiError::from)?;
    Ok(Json(response))
}
