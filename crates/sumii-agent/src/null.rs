use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::{AgentError, Result};
use crate::event::StreamEvent;
use crate::RemoteAgent;

/// Scripted test double: a queue of canned event batches consumed one per
/// call to `start_stream`/`append_stream`, in order. Lets orchestrator
/// tests drive exact scenarios without a live remote service.
pub struct NullRemoteAgent {
    scripts: Mutex<Vec<Vec<StreamEvent>>>,
    next_handle: AtomicU64,
}

impl NullRemoteAgent {
    pub fn new(scripts: Vec<Vec<StreamEvent>>) -> Self {
        Self {
            scripts: Mutex::new(scripts),
            next_handle: AtomicU64::new(1),
        }
    }

    fn next_script(&self) -> Result<Vec<StreamEvent>> {
        let mut scripts = self.scripts.lock().unwrap();
        if scripts.is_empty() {
            return Err(AgentError::RemoteError("NullRemoteAgent script exhausted".to_string()));
        }
        Ok(scripts.remove(0))
    }
}

#[async_trait]
impl RemoteAgent for NullRemoteAgent {
    async fn start_stream(&self, _agent_id: &str, _message: &str) -> Result<(String, mpsc::Receiver<StreamEvent>)> {
        let handle = format!("remote-{}", self.next_handle.fetch_add(1, Ordering::SeqCst));
        let rx = self.spawn_script()?;
        Ok((handle, rx))
    }

    async fn append_stream(&self, _handle: &str, _message: &str) -> Result<mpsc::Receiver<StreamEvent>> {
        self.spawn_script()
    }
}

impl NullRemoteAgent {
    fn spawn_script(&self) -> Result<mpsc::Receiver<StreamEvent>> {
        let events = self.next_script()?;
        let (tx, rx) = mpsc::channel(events.len().max(1) + 1);
        tokio::spawn(async move {
            for event in events {
                if tx.send(event).await.is_err() {
                    return;
                }
            }
            let _ = tx.send(StreamEvent::StreamCompletion).await;
        });
        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_scripted_events_in_order() {
        let agent = NullRemoteAgent::new(vec![vec![StreamEvent::MessageOutput { text: "hallo".into() }]]);
        let (handle, mut rx) = agent.start_stream("intake", "hi").await.unwrap();
        assert!(handle.starts_with("remote-"));
        let first = rx.recv().await.unwrap();
        assert!(matches!(first, StreamEvent::MessageOutput { text } if text == "hallo"));
        let second = rx.recv().await.unwrap();
        assert!(matches!(second, StreamEvent::StreamCompletion));
    }

    #[tokio::test]
    async fn run_concatenates_message_output_until_completion() {
        let agent = NullRemoteAgent::new(vec![vec![
            StreamEvent::MessageOutput { text: "a".into() },
            StreamEvent::MessageOutput { text: "b".into() },
        ]]);
        let text = agent.run("remote-1", "hi").await.unwrap();
        assert_eq!(text, "ab");
    }
}
