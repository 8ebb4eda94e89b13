use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use sumii_protocol::webhook::{LawyerResponsePayload, WebhookResponse};

use crate::app::AppState;
use crate::respond::ApiError;

const API_KEY_HEADER: &str = "x-api-key";

/// POST /api/v1/webhooks/lawyer-response. Authenticated by a plain shared
/// secret rather than the bearer-token scheme REST handlers use — the
/// directory service is not a logged-in user. An unconfigured secret
/// accepts any key, the documented development bypass.
pub async fn lawyer_response(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<LawyerResponsePayload>,
) -> Result<Json<WebhookResponse>, ApiError> {
    let api_key = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()).unwrap_or("");

    state.webhook.authenticate(api_key).map_err(sumii_core::SumiiError::from)?;

    let response = state.webhook.handle_lawyer_response(payload).await.map_err(sumii_core::SumiiError::from)?;
    Ok(Json(response))
}
