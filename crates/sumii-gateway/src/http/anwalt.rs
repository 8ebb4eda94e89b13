use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use sumii_db::models::LawyerConnection;

use crate::anwalt_client::{LawyerProfile, LawyerSearchParams};
use crate::app::AppState;
use crate::auth::require_user;
use crate::respond::ApiError;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub language: String,
    pub legal_area: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    #[serde(default = "default_radius")]
    pub radius: f64,
}

fn default_radius() -> f64 {
    10.0
}

#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    pub conversation_id: String,
    pub lawyer_id: String,
    #[serde(default)]
    pub message: String,
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(q): Query<SearchQuery>,
) -> Result<Json<Vec<LawyerProfile>>, ApiError> {
    require_user(&headers, &state.config.gateway.jwt_secret)?;
    let params = LawyerSearchParams { language: q.language, legal_area: q.legal_area, lat: q.lat, lng: q.lng, radius: q.radius };
    Ok(Json(state.anwalt.search(&params).await?))
}

/// POST /api/v1/anwalt/connect — creates the connection row, then
/// best-effort hands the case off to sumii-anwalt if a summary already
/// exists; handoff failure never fails connection creation.
pub async fn connect(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<ConnectRequest>,
) -> Result<Json<LawyerConnection>, ApiError> {
    let user_id = require_user(&headers, &state.config.gateway.jwt_secret)?;
    let conversation = state.db.get_conversation(&req.conversation_id, &user_id)?;

    let profile = state
        .anwalt
        .get_profile(&req.lawyer_id)
        .await?
        .ok_or_else(|| sumii_core::SumiiError::NotFound(format!("lawyer {}", req.lawyer_id)))?;

    if state
        .db
        .find_lawyer_connection_by_conversation_and_lawyer(&req.conversation_id, &req.lawyer_id)?
        .is_some()
    {
        return Err(sumii_core::SumiiError::Conflict("connection already exists for this conversation and lawyer".into()).into());
    }

    let summary = state.db.get_summary_by_conversation(&req.conversation_id)?;
    let connection = state.db.create_lawyer_connection(
        &user_id,
        &req.conversation_id,
        summary.as_ref().map(|s| s.id.as_str()),
        &req.lawyer_id,
        &profile.full_name,
        &req.message,
    )?;

    if let Some(summary) = summary {
        let user = state.db.get_user(&user_id)?;
        let user_location = user.as_ref().and_then(|u| match (u.latitude, u.longitude) {
            (Some(lat), Some(lng)) => Some(serde_json::json!({"lat": lat, "lng": lng})),
            _ => None,
        });
        let legal_area = conversation.legal_area.as_deref().unwrap_or("Other");
        let urgency = conversation.urgency.as_deref().unwrap_or("weeks");
        match state
            .anwalt
            .handoff_case(&user_id, &summary.id, &summary.pdf_url.unwrap_or_default(), &req.lawyer_id, legal_area, urgency, user_location)
            .await
        {
            Ok(handoff) => {
                if let Some(case_id) = handoff.case_id {
                    if let Err(err) = state.db.bind_external_case_id(&connection.id, &case_id) {
                        tracing::warn!(%err, connection_id = %connection.id, "failed to persist handoff case_id");
                    }
                }
            }
            Err(err) => {
                tracing::warn!(%err, connection_id = %connection.id, "case handoff to anwalt backend failed");
            }
        }
    }

    Ok(Json(state.db.get_lawyer_connection(&connection.id, &user_id)?))
}

pub async fn connections(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Json<Vec<LawyerConnection>>, ApiError> {
    let user_id = require_user(&headers, &state.config.gateway.jwt_secret)?;
    Ok(Json(state.db.list_lawyer_connections(&user_id)?))
}
