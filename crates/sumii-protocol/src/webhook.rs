//! Inbound lawyer-response webhook wire shapes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LawyerResponsePayload {
    pub case_id: String,
    pub conversation_id: String,
    pub user_id: String,
    pub lawyer_id: String,
    pub lawyer_name: String,
    pub response_text: String,
    pub response_timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub status: &'static str,
    pub notification_id: String,
    pub email_sent: bool,
}

impl WebhookResponse {
    pub fn success(notification_id: impl Into<String>, email_sent: bool) -> Self {
        Self {
            status: "success",
            notification_id: notification_id.into(),
            email_sent,
        }
    }
}
