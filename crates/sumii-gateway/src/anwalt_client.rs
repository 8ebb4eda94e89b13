//! Thin HTTP bridge to the sumii-anwalt lawyer directory service. Grounded
//! on `examples/original_source/app/api/v1/anwalt.py`'s three calls
//! (search, profile lookup, case handoff) — this gateway never stores a
//! lawyer directory of its own, it just forwards.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use sumii_core::SumiiError;

#[derive(Debug, Clone, Serialize)]
pub struct LawyerSearchParams {
    pub language: String,
    pub legal_area: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LawyerProfile {
    pub id: String,
    pub full_name: String,
    #[serde(default)]
    pub bar_id: Option<String>,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub languages: Option<String>,
    #[serde(default)]
    pub distance: Option<f64>,
}

#[derive(Serialize)]
struct HandoffRequest<'a> {
    user_id: &'a str,
    summary_id: &'a str,
    summary_pdf_url: &'a str,
    lawyer_id: &'a str,
    legal_area: &'a str,
    urgency: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_location: Option<Value>,
}

#[derive(Deserialize)]
pub struct HandoffResponse {
    pub case_id: Option<String>,
}

pub struct AnwaltClient {
    client: reqwest::Client,
    base_url: Option<String>,
    api_key: Option<String>,
}

impl AnwaltClient {
    pub fn new(base_url: Option<String>, api_key: Option<String>) -> Self {
        Self { client: reqwest::Client::new(), base_url, api_key }
    }

    fn require_base_url(&self) -> Result<&str, SumiiError> {
        self.base_url
            .as_deref()
            .ok_or_else(|| SumiiError::Config("ANWALT_BASE_URL not configured".into()))
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    #[instrument(skip(self))]
    pub async fn search(&self, params: &LawyerSearchParams) -> Result<Vec<LawyerProfile>, SumiiError> {
        let base = self.require_base_url()?;
        let request = self.authed(self.client.get(format!("{base}/lawyers/search"))).query(params);
        let response = request.send().await.map_err(|e| SumiiError::RemoteAgent(format!("anwalt search failed: {e}")))?;
        if !response.status().is_success() {
            return Err(SumiiError::RemoteAgent(format!("anwalt search returned {}", response.status())));
        }
        response.json().await.map_err(|e| SumiiError::RemoteAgent(format!("malformed anwalt search response: {e}")))
    }

    #[instrument(skip(self))]
    pub async fn get_profile(&self, lawyer_id: &str) -> Result<Option<LawyerProfile>, SumiiError> {
        let base = self.require_base_url()?;
        let request = self.authed(self.client.get(format!("{base}/lawyers/{lawyer_id}")));
        let response = request.send().await.map_err(|e| SumiiError::RemoteAgent(format!("anwalt profile lookup failed: {e}")))?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(SumiiError::RemoteAgent(format!("anwalt profile lookup returned {}", response.status())));
        }
        response.json().await.map(Some).map_err(|e| SumiiError::RemoteAgent(format!("malformed anwalt profile response: {e}")))
    }

    #[instrument(skip(self, summary_pdf_url, user_location))]
    #[allow(clippy::too_many_arguments)]
    pub async fn handoff_case(
        &self,
        user_id: &str,
        summary_id: &str,
        summary_pdf_url: &str,
        lawyer_id: &str,
        legal_area: &str,
        urgency: &str,
        user_location: Option<Value>,
    ) -> Result<HandoffResponse, SumiiError> {
        let base = self.require_base_url()?;
        let body = HandoffRequest { user_id, summary_id, summary_pdf_url, lawyer_id, legal_area, urgency, user_location };
        let request = self.authed(self.client.post(format!("{base}/cases/handoff"))).json(&body);
        let response = request.send().await.map_err(|e| SumiiError::RemoteAgent(format!("anwalt handoff failed: {e}")))?;
        if !response.status().is_success() {
            return Err(SumiiError::RemoteAgent(format!("anwalt handoff returned {}", response.status())));
        }
        response.json().await.map_err(|e| SumiiError::RemoteAgent(format!("malformed anwalt handoff response: {e}")))
    }
}
