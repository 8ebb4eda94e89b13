use thiserror::Error;

/// Coarse error taxonomy from the error-handling design (not a wire type —
/// used by the gateway to pick an HTTP status / WS close code / outbound
/// `error` frame without re-deriving policy per call site).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InputValidation,
    Auth,
    Authorization,
    NotFound,
    Conflict,
    RemoteDependency,
    Internal,
}

#[derive(Debug, Error)]
pub enum SumiiError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("remote agent error: {0}")]
    RemoteAgent(String),

    #[error("OCR error: {0}")]
    Ocr(String),

    #[error("blob store error: {0}")]
    Blob(String),

    #[error("email error: {0}")]
    Email(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl SumiiError {
    /// Short error code string, sent to clients in WS `error` frames and
    /// REST JSON error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            SumiiError::Config(_) => "CONFIG_ERROR",
            SumiiError::InvalidInput(_) => "INVALID_INPUT",
            SumiiError::AuthFailed(_) => "AUTH_FAILED",
            SumiiError::Forbidden(_) => "FORBIDDEN",
            SumiiError::NotFound(_) => "NOT_FOUND",
            SumiiError::Conflict(_) => "CONFLICT",
            SumiiError::Database(_) => "DATABASE_ERROR",
            SumiiError::RemoteAgent(_) => "AGENT_PROCESSING_ERROR",
            SumiiError::Ocr(_) => "OCR_ERROR",
            SumiiError::Blob(_) => "BLOB_ERROR",
            SumiiError::Email(_) => "EMAIL_ERROR",
            SumiiError::Serialization(_) => "SERIALIZATION_ERROR",
            SumiiError::Io(_) => "IO_ERROR",
            SumiiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SumiiError::Config(_) => ErrorKind::Internal,
            SumiiError::InvalidInput(_) => ErrorKind::InputValidation,
            SumiiError::AuthFailed(_) => ErrorKind::Auth,
            SumiiError::Forbidden(_) => ErrorKind::Authorization,
            SumiiError::NotFound(_) => ErrorKind::NotFound,
            SumiiError::Conflict(_) => ErrorKind::Conflict,
            SumiiError::Database(_) => ErrorKind::Internal,
            SumiiError::RemoteAgent(_) | SumiiError::Ocr(_) | SumiiError::Blob(_) | SumiiError::Email(_) => {
                ErrorKind::RemoteDependency
            }
            SumiiError::Serialization(_) => ErrorKind::InputValidation,
            SumiiError::Io(_) => ErrorKind::Internal,
            SumiiError::Internal(_) => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, SumiiError>;
