use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Db(#[from] sumii_db::DbError),

    #[error(transparent)]
    Blob(#[from] sumii_blob::BlobError),

    #[error(transparent)]
    Agent(#[from] sumii_agent::AgentError),

    #[error(transparent)]
    Artifact(#[from] sumii_artifact::ArtifactError),

    #[error("invalid webhook api key")]
    InvalidWebhookSignature,

    #[error("unknown webhook user {0}")]
    UserNotFound(String),
}

impl From<OrchestratorError> for sumii_core::SumiiError {
    fn from(e: OrchestratorError) -> Self {
        match e {
            OrchestratorError::Db(e) => e.into(),
            OrchestratorError::Blob(e) => e.into(),
            OrchestratorError::Agent(e) => e.into(),
            OrchestratorError::Artifact(e) => e.into(),
            OrchestratorError::InvalidWebhookSignature => sumii_core::SumiiError::AuthFailed("webhook api key mismatch".to_string()),
            OrchestratorError::UserNotFound(id) => sumii_core::SumiiError::NotFound(format!("user {id}")),
        }
    }
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
