use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("remote agent error: {0}")]
    RemoteError(String),

    #[error("unknown remote conversation handle: {0}")]
    UnknownHandle(String),

    #[error("stream parse error: {0}")]
    Parse(String),
}

impl From<AgentError> for sumii_core::SumiiError {
    fn from(e: AgentError) -> Self {
        sumii_core::SumiiError::RemoteAgent(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AgentError>;
