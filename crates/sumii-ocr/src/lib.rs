pub mod error;
pub mod http;
pub mod null;

use async_trait::async_trait;

pub use error::{OcrError, Result};
pub use http::HttpOcrEngine;
pub use null::NullOcrEngine;

/// Document text extraction boundary. `extract_text` never returns an
/// error to the caller — unsupported MIME types and upstream failures both
/// resolve to an empty string, so a single document failure never
/// aborts the turn it was attached to.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn extract_text(&self, bytes: &[u8], mime_type: &str, filename: &str) -> String;
}
