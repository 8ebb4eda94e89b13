use async_trait::async_trait;

use crate::OcrEngine;

/// Test double returning a fixed string for any supported mime type and
/// `""` for anything else, mirroring the real engine's failure contract.
#[derive(Default)]
pub struct NullOcrEngine {
    pub fixed_text: String,
}

impl NullOcrEngine {
    pub fn new(fixed_text: impl Into<String>) -> Self {
        Self { fixed_text: fixed_text.into() }
    }
}

#[async_trait]
impl OcrEngine for NullOcrEngine {
    async fn extract_text(&self, _bytes: &[u8], mime_type: &str, _filename: &str) -> String {
        if mime_type.starts_with("image/") || mime_type == "application/pdf" {
            self.fixed_text.clone()
        } else {
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unsupported_mime_type_yields_empty_string() {
        let engine = NullOcrEngine::new("hallo");
        assert_eq!(engine.extract_text(b"", "text/plain", "x.txt").await, "");
        assert_eq!(engine.extract_text(b"", "image/png", "x.png").await, "hallo");
    }
}
