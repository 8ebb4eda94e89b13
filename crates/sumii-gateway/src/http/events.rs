use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use sumii_orchestrator::NotificationStream;

use crate::app::AppState;
use crate::auth::verify_bearer_token;
use crate::respond::ApiError;

#[derive(Debug, Deserialize)]
pub struct SubscribeQuery {
    pub token: String,
}

/// GET /api/v1/events/subscribe?token=<jwt>. The
/// credential travels in the query string because `EventSource` cannot set
/// custom headers, the same constraint the WS handshake documents in spec
/// §4.1. `NotificationStream` already renders complete `event:`/`data:`
/// frames, so the body here is the raw byte stream, not axum's typed SSE
/// helper.
pub async fn subscribe_handler(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SubscribeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = verify_bearer_token(&q.token, &state.config.gateway.jwt_secret)
        .map_err(|e| sumii_core::SumiiError::AuthFailed(e.to_string()))?;

    let notifications = NotificationStream::new(state.db.clone(), user_id);
    let stream = async_stream::stream! {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(
            sumii_core::config::NOTIFICATION_POLL_INTERVAL_SECS,
        ));
        loop {
            ticker.tick().await;
            match notifications.poll_once() {
                Ok(frames) => {
                    for frame in frames {
                        yield Ok::<_, std::io::Error>(axum::body::Bytes::from(frame.frame));
                        if let Err(err) = notifications.mark_delivered(&frame.id) {
                            tracing::warn!(%err, "failed to mark notification delivered");
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(%err, "notification poll failed");
                }
            }
        }
    };

    let mut response: Response = Response::new(Body::from_stream(stream));
    response.headers_mut().insert(header::CONTENT_TYPE, "text/event-stream".parse().unwrap());
    response.headers_mut().insert(header::CACHE_CONTROL, "no-cache".parse().unwrap());
    response.headers_mut().insert(header::CONNECTION, "keep-alive".parse().unwrap());
    response.headers_mut().insert("X-Accel-Buffering", "no".parse().unwrap());
    Ok(response)
}
