use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("blob store error: {0}")]
    Backend(String),
}

impl From<BlobError> for sumii_core::SumiiError {
    fn from(e: BlobError) -> Self {
        match e {
            BlobError::NotFound(m) => sumii_core::SumiiError::NotFound(m),
            BlobError::Backend(m) => sumii_core::SumiiError::Blob(m),
        }
    }
}

pub type Result<T> = std::result::Result<T, BlobError>;
