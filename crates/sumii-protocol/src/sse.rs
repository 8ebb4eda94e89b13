//! Server-push event stream wire shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One SSE `data:` payload. The SSE `event:` line is set to `notification_type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEvent {
    #[serde(rename = "type")]
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub data: Value,
}

impl NotificationEvent {
    /// Render the two-line `event:`/`data:` frame, blank-line terminated,
    ///'s framing.
    pub fn to_sse_frame(&self) -> Result<String, serde_json::Error> {
        let data = serde_json::to_string(self)?;
        Ok(format!("event: {}\ndata: {}\n\n", self.notification_type, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sse_frame_has_blank_line_terminator() {
        let ev = NotificationEvent {
            notification_type: "summary_ready".into(),
            title: "Fertig".into(),
            message: "Ihre Zusammenfassung ist bereit".into(),
            data: serde_json::json!({"summary_id": "s1"}),
        };
        let frame = ev.to_sse_frame().unwrap();
        assert!(frame.starts_with("event: summary_ready\n"));
        assert!(frame.ends_with("\n\n"));
        assert!(frame.contains("data: "));
    }
}
