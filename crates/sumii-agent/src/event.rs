use serde_json::Value;

/// Events emitted while a remote agent drives one turn: the six kinds
/// the remote conversational service can emit, rather than a single
/// provider's token-level vocabulary.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// Incremental assistant text.
    MessageOutput { text: String },

    /// The remote side handed the conversation from one named agent to
    /// another (e.g. intake router → legal-area specialist).
    AgentHandoff { from_agent: String, to_agent: String },

    /// The remote side started running a named tool on its end. Informational
    /// only — this crate's `RemoteAgent` has no tool-execution loop of its
    /// own, unlike a client-side tool runner.
    ToolExecutionStarted { tool_name: String },

    /// The remote side wants the orchestrator to run a function locally and
    /// report the result back via `append_stream`.
    FunctionCall { id: String, name: String, arguments: Value },

    /// The remote side failed this turn.
    ResponseError { message: String },

    /// The turn is over; no more events will arrive on this channel.
    StreamCompletion,
}
