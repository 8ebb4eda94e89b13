//! Duplex chat channel wire frames.

use serde::{Deserialize, Serialize};

/// Client → server. The only inbound shape the orchestrator accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessageFrame {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    #[serde(default)]
    pub document_ids: Vec<String>,
}

/// Server → client, tagged on `kind`. One variant per outbound frame type
/// named in
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum OutboundFrame {
    #[serde(rename = "agent_start")]
    AgentStart { agent: String },

    #[serde(rename = "message_chunk")]
    MessageChunk { content: String, agent: String },

    #[serde(rename = "message_complete")]
    MessageComplete {
        id: String,
        content: String,
        agent: String,
        created_at: String,
    },

    #[serde(rename = "agent_handoff")]
    AgentHandoff {
        #[serde(rename = "fromAgent")]
        from_agent: String,
        #[serde(rename = "toAgent")]
        to_agent: String,
    },

    #[serde(rename = "tool_execution")]
    ToolExecution { tool: String },

    #[serde(rename = "function_call")]
    FunctionCall {
        tool_call_id: String,
        function: String,
        arguments: String,
    },

    #[serde(rename = "wrapup_ready")]
    WrapupReady { conversation_id: String },

    #[serde(rename = "summary_generating")]
    SummaryGenerating { conversation_id: String },

    #[serde(rename = "summary_ready")]
    SummaryReady {
        summary_id: String,
        reference_number: String,
        pdf_url: String,
    },

    #[serde(rename = "summary_error")]
    SummaryError { error: String },

    #[serde(rename = "error")]
    Error { error: String, code: String },
}

impl OutboundFrame {
    pub fn error(message: impl Into<String>, code: impl Into<String>) -> Self {
        OutboundFrame::Error {
            error: message.into(),
            code: code.into(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbound_message_round_trip() {
        let json = r#"{"type":"message","content":"hello","document_ids":["a","b"]}"#;
        let frame: InboundMessageFrame = serde_json::from_str(json).unwrap();
        assert_eq!(frame.kind, "message");
        assert_eq!(frame.content, "hello");
        assert_eq!(frame.document_ids, vec!["a", "b"]);
    }

    #[test]
    fn inbound_message_defaults_document_ids() {
        let json = r#"{"type":"message","content":"hi"}"#;
        let frame: InboundMessageFrame = serde_json::from_str(json).unwrap();
        assert!(frame.document_ids.is_empty());
    }

    #[test]
    fn outbound_agent_handoff_uses_camel_case_fields() {
        let frame = OutboundFrame::AgentHandoff {
            from_agent: "router".into(),
            to_agent: "intake".into(),
        };
        let json = frame.to_json().unwrap();
        assert!(json.contains(r#""kind":"agent_handoff""#));
        assert!(json.contains(r#""fromAgent":"router""#));
        assert!(json.contains(r#""toAgent":"intake""#));
    }

    #[test]
    fn outbound_error_frame_shape() {
        let frame = OutboundFrame::error("Empty message", "empty_message");
        let json = frame.to_json().unwrap();
        assert!(json.contains(r#""kind":"error""#));
        assert!(json.contains(r#""code":"empty_message""#));
    }

    #[test]
    fn outbound_summary_ready_reference_number_shape() {
        let frame = OutboundFrame::SummaryReady {
            summary_id: "s1".into(),
            reference_number: "SUM-20250127-A3F2K".into(),
            pdf_url: "https://example.com/x.pdf".into(),
        };
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["reference_number"], "SUM-20250127-A3F2K");
    }
}
