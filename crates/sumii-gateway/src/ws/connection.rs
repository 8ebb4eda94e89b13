use std::sync::Arc;

use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::app::AppState;
use crate::auth::verify_bearer_token;

const CLOSE_POLICY_VIOLATION: u16 = 1008;
const CLOSE_UNSUPPORTED_DATA: u16 = 1003;
const CLOSE_INTERNAL_ERROR: u16 = 1011;

#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub token: String,
}

#[derive(Debug, Deserialize)]
struct InboundChatFrame {
    #[serde(default)]
    content: String,
    #[serde(default)]
    document_ids: Vec<String>,
}

/// GET /ws/chat/{conversation_id}?token=<jwt>. The credential travels in the query string since the
/// channel transport has no custom-header support.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<String>,
    Query(q): Query<ConnectQuery>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state, conversation_id, q.token))
}

async fn handle_connection(socket: WebSocket, state: Arc<AppState>, conversation_id: String, token: String) {
    let (mut tx, mut rx) = socket.split();

    let user_id = match verify_bearer_token(&token, &state.config.gateway.jwt_secret) {
        Ok(sub) => sub,
        Err(e) => {
            warn!(error = %e, "WS handshake auth failed");
            close_with(&mut tx, CLOSE_POLICY_VIOLATION, "invalid credential").await;
            return;
        }
    };

    if conversation_id.trim().is_empty() {
        close_with(&mut tx, CLOSE_UNSUPPORTED_DATA, "malformed conversation id").await;
        return;
    }

    if let Err(e) = state.db.get_conversation(&conversation_id, &user_id) {
        warn!(error = %e, conversation_id = %conversation_id, "WS conversation lookup failed");
        close_with(&mut tx, CLOSE_POLICY_VIOLATION, "conversation not found or not owned by requester").await;
        return;
    }

    info!(conversation_id = %conversation_id, user_id = %user_id, "WS chat connection established");

    loop {
        match rx.next().await {
            Some(Ok(Message::Text(text))) => {
                let frame: InboundChatFrame = match serde_json::from_str(&text) {
                    Ok(f) => f,
                    Err(e) => {
                        warn!(error = %e, "malformed inbound chat frame");
                        close_with(&mut tx, CLOSE_UNSUPPORTED_DATA, "malformed frame").await;
                        break;
                    }
                };

                if frame.content.trim().is_empty() {
                    let error = sumii_protocol::chat::OutboundFrame::error("message content must not be empty", "empty_message");
                    if send_frame(&mut tx, &error).await.is_err() {
                        break;
                    }
                    continue;
                }

                let (out_tx, mut out_rx) = mpsc::channel(32);
                let turn_fut = state.turn.run(&conversation_id, &user_id, &frame.content, &frame.document_ids, out_tx);
                tokio::pin!(turn_fut);

                let mut turn_result = None;
                let mut send_failed = false;
                loop {
                    tokio::select! {
                        frame = out_rx.recv() => {
                            match frame {
                                Some(frame) => {
                                    if send_frame(&mut tx, &frame).await.is_err() {
                                        send_failed = true;
                                        break;
                                    }
                                }
                                None => break,
                            }
                        }
                        res = &mut turn_fut, if turn_result.is_none() => {
                            turn_result = Some(res);
                        }
                    }
                }

                if send_failed {
                    return;
                }
                if let Some(Err(e)) = turn_result {
                    warn!(error = %e, "turn failed");
                    let sumii_error: sumii_core::SumiiError = e.into();
                    let error = sumii_protocol::chat::OutboundFrame::error(sumii_error.to_string(), sumii_error.code());
                    let _ = send_frame(&mut tx, &error).await;
                    close_with(&mut tx, CLOSE_INTERNAL_ERROR, "internal error").await;
                    break;
                }
            }
            Some(Ok(Message::Ping(data))) => {
                let _ = tx.send(Message::Pong(data)).await;
            }
            Some(Ok(Message::Close(_))) | None => break,
            Some(Err(e)) => {
                warn!(error = %e, "WS read error");
                break;
            }
            _ => {}
        }
    }

    info!(conversation_id = %conversation_id, user_id = %user_id, "WS chat connection closed");
}

async fn send_frame(
    tx: &mut futures_util::stream::SplitSink<WebSocket, Message>,
    frame: &sumii_protocol::chat::OutboundFrame,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(frame).unwrap_or_default();
    tx.send(Message::Text(json.into())).await
}

async fn close_with(tx: &mut futures_util::stream::SplitSink<WebSocket, Message>, code: u16, reason: &'static str) {
    let _ = tx
        .send(Message::Close(Some(CloseFrame { code, reason: reason.into() })))
        .await;
}
