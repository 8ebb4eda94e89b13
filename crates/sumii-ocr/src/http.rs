use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::error::{OcrError, Result};
use crate::OcrEngine;

#[derive(Serialize)]
struct OcrRequest<'a> {
    model: &'a str,
    data_uri: String,
    filename: &'a str,
}

#[derive(Deserialize)]
struct OcrResponse {
    #[serde(default)]
    text: String,
}

/// Calls a remote OCR endpoint over HTTP, the same way `sumii-agent`'s
/// remote adapter reaches a conversational model — base64 data URI in,
/// extracted text out. Points at any Mistral-compatible OCR endpoint; the
/// base URL and model names are config, not hardcoded vendor strings.
pub struct HttpOcrEngine {
    client: reqwest::Client,
    base_url: String,
    image_model: String,
    document_model: String,
    api_key: String,
}

impl HttpOcrEngine {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            image_model: "pixtral-large-latest".to_string(),
            document_model: "mistral-ocr-latest".to_string(),
            api_key: api_key.into(),
        }
    }

    async fn call(&self, model: &str, bytes: &[u8], mime_type: &str, filename: &str) -> Result<String> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        let data_uri = format!("data:{mime_type};base64,{encoded}");
        let response = self
            .client
            .post(format!("{}/v1/ocr", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&OcrRequest { model, data_uri, filename })
            .send()
            .await
            .map_err(|e| OcrError::Backend(e.to_string()))?;

        if !response.status().is_success() {
            return Err(OcrError::Backend(format!("ocr endpoint returned {}", response.status())));
        }

        let parsed: OcrResponse = response.json().await.map_err(|e| OcrError::Backend(e.to_string()))?;
        Ok(parsed.text)
    }
}

#[async_trait]
impl OcrEngine for HttpOcrEngine {
    /// Failures of any kind collapse to `""` so a
    /// single unreadable document never blocks a conversation turn.
    #[instrument(skip(self, bytes))]
    async fn extract_text(&self, bytes: &[u8], mime_type: &str, filename: &str) -> String {
        let result = if mime_type.starts_with("image/") {
            self.call(&self.image_model, bytes, mime_type, filename).await
        } else if mime_type == "application/pdf" {
            self.call(&self.document_model, bytes, mime_type, filename).await
        } else {
            warn!(mime_type, filename, "unsupported OCR mime type");
            return String::new();
        };

        result.unwrap_or_else(|err| {
            warn!(filename, %err, "OCR extraction failed");
            String::new()
        })
    }
}
