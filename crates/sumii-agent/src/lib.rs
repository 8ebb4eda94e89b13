pub mod error;
pub mod event;
pub mod http;
pub mod null;

use async_trait::async_trait;
use tokio::sync::mpsc;

pub use error::{AgentError, Result};
pub use event::StreamEvent;
pub use http::HttpRemoteAgent;
pub use null::NullRemoteAgent;

/// Boundary to the conversational model that actually drives a turn. Two
/// entry points distinguish opening a remote-side conversation from
/// continuing one already in progress, matching the
/// `remote_conversation_handle` lifecycle.
#[async_trait]
pub trait RemoteAgent: Send + Sync {
    /// Open a new remote conversation, routed to `agent_id`, and send its
    /// first message. Returns the opaque handle to persist on the
    /// conversation row.
    async fn start_stream(&self, agent_id: &str, message: &str) -> Result<(String, mpsc::Receiver<StreamEvent>)>;

    /// Continue an already-open remote conversation.
    async fn append_stream(&self, handle: &str, message: &str) -> Result<mpsc::Receiver<StreamEvent>>;

    /// Drain a turn to its final assistant text without surfacing
    /// intermediate events — used by callers that only need the end
    /// result (e.g. background regeneration), not a live stream.
    async fn run(&self, handle: &str, message: &str) -> Result<String> {
        let mut rx = self.append_stream(handle, message).await?;
        let mut out = String::new();
        while let Some(event) = rx.recv().await {
            match event {
                StreamEvent::MessageOutput { text } => out.push_str(&text),
                StreamEvent::ResponseError { message } => return Err(AgentError::RemoteError(message)),
                StreamEvent::StreamCompletion => break,
                _ => {}
            }
        }
        Ok(out)
    }
}
