use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("unsupported mime type: {0}")]
    UnsupportedMimeType(String),

    #[error("ocr backend error: {0}")]
    Backend(String),
}

impl From<OcrError> for sumii_core::SumiiError {
    fn from(e: OcrError) -> Self {
        sumii_core::SumiiError::Ocr(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OcrError>;
