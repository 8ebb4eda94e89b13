use async_trait::async_trait;
use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{instrument, warn};

use crate::error::{AgentError, Result};
use crate::event::StreamEvent;
use crate::RemoteAgent;

#[derive(Deserialize)]
struct StartResponse {
    handle: String,
}

/// Talks to a remote conversational service over HTTP, consuming a
/// `text/event-stream` body: read chunks, split on blank-line record
/// boundaries, parse `event:`/`data:` lines, forward into an mpsc channel.
pub struct HttpRemoteAgent {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpRemoteAgent {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn stream_messages(&self, url: String, body: Value) -> mpsc::Receiver<StreamEvent> {
        let (tx, rx) = mpsc::channel(64);
        let client = self.client.clone();
        let api_key = self.api_key.clone();
        tokio::spawn(async move {
            let response = match client.post(&url).bearer_auth(&api_key).json(&body).send().await {
                Ok(r) => r,
                Err(e) => {
                    let _ = tx.send(StreamEvent::ResponseError { message: e.to_string() }).await;
                    return;
                }
            };
            if !response.status().is_success() {
                let _ = tx
                    .send(StreamEvent::ResponseError { message: format!("remote agent returned {}", response.status()) })
                    .await;
                return;
            }

            let mut stream = response.bytes_stream();
            let mut buf = String::new();
            while let Some(chunk) = stream.next().await {
                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        let _ = tx.send(StreamEvent::ResponseError { message: e.to_string() }).await;
                        break;
                    }
                };
                buf.push_str(&String::from_utf8_lossy(&chunk));
                while let Some(pos) = buf.find("\n\n") {
                    let record = buf[..pos].to_string();
                    buf.drain(..pos + 2);
                    if let Some(event) = parse_sse_record(&record) {
                        if tx.send(event).await.is_err() {
                            return;
                        }
                    }
                }
            }
            let _ = tx.send(StreamEvent::StreamCompletion).await;
        });
        rx
    }
}

/// Parse one `event: <kind>\ndata: <json>` record into a [`StreamEvent`].
fn parse_sse_record(record: &str) -> Option<StreamEvent> {
    let mut kind: Option<&str> = None;
    let mut data: Option<&str> = None;
    for line in record.lines() {
        if let Some(v) = line.strip_prefix("event: ") {
            kind = Some(v);
        } else if let Some(v) = line.strip_prefix("data: ") {
            data = Some(v);
        }
    }
    let kind = kind?;
    let data = data?;
    let payload: Value = serde_json::from_str(data).ok()?;

    match kind {
        "message_output" => Some(StreamEvent::MessageOutput {
            text: payload.get("text")?.as_str()?.to_string(),
        }),
        "agent_handoff" => Some(StreamEvent::AgentHandoff {
            from_agent: payload.get("from_agent")?.as_str()?.to_string(),
            to_agent: payload.get("to_agent")?.as_str()?.to_string(),
        }),
        "tool_execution_started" => Some(StreamEvent::ToolExecutionStarted {
            tool_name: payload.get("tool_name")?.as_str()?.to_string(),
        }),
        "function_call" => Some(StreamEvent::FunctionCall {
            id: payload.get("id")?.as_str()?.to_string(),
            name: payload.get("name")?.as_str()?.to_string(),
            arguments: payload.get("arguments").cloned().unwrap_or(Value::Null),
        }),
        "response_error" => Some(StreamEvent::ResponseError {
            message: payload.get("message")?.as_str().unwrap_or("remote agent error").to_string(),
        }),
        "stream_completion" => Some(StreamEvent::StreamCompletion),
        other => {
            warn!(kind = other, "unknown remote stream event kind");
            None
        }
    }
}

#[async_trait]
impl RemoteAgent for HttpRemoteAgent {
    #[instrument(skip(self, message))]
    async fn start_stream(&self, agent_id: &str, message: &str) -> Result<(String, mpsc::Receiver<StreamEvent>)> {
        let start: StartResponse = self
            .client
            .post(format!("{}/v1/conversations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "agent_id": agent_id, "message": message }))
            .send()
            .await?
            .error_for_status()
            .map_err(AgentError::Http)?
            .json()
            .await?;

        let rx = self.stream_messages(
            format!("{}/v1/conversations/{}/messages", self.base_url, start.handle),
            serde_json::json!({ "message": message }),
        );
        Ok((start.handle, rx))
    }

    #[instrument(skip(self, message))]
    async fn append_stream(&self, handle: &str, message: &str) -> Result<mpsc::Receiver<StreamEvent>> {
        Ok(self.stream_messages(
            format!("{}/v1/conversations/{}/messages", self.base_url, handle),
            serde_json::json!({ "message": message }),
        ))
    }
}
