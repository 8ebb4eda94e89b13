use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    Active,
    Completed,
    Archived,
}

impl fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversationStatus::Active => write!(f, "active"),
            ConversationStatus::Completed => write!(f, "completed"),
            ConversationStatus::Archived => write!(f, "archived"),
        }
    }
}

impl FromStr for ConversationStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ConversationStatus::Active),
            "completed" => Ok(ConversationStatus::Completed),
            "archived" => Ok(ConversationStatus::Archived),
            other => Err(format!("unknown conversation status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
            MessageRole::System => write!(f, "system"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            "system" => Ok(MessageRole::System),
            other => Err(format!("unknown message role: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Uploading,
    Completed,
    Failed,
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadStatus::Uploading => write!(f, "uploading"),
            UploadStatus::Completed => write!(f, "completed"),
            UploadStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for UploadStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uploading" => Ok(UploadStatus::Uploading),
            "completed" => Ok(UploadStatus::Completed),
            "failed" => Ok(UploadStatus::Failed),
            other => Err(format!("unknown upload status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl fmt::Display for OcrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OcrStatus::Pending => write!(f, "pending"),
            OcrStatus::Processing => write!(f, "processing"),
            OcrStatus::Completed => write!(f, "completed"),
            OcrStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for OcrStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OcrStatus::Pending),
            "processing" => Ok(OcrStatus::Processing),
            "completed" => Ok(OcrStatus::Completed),
            "failed" => Ok(OcrStatus::Failed),
            other => Err(format!("unknown ocr status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LawyerConnectionStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

impl fmt::Display for LawyerConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LawyerConnectionStatus::Pending => write!(f, "pending"),
            LawyerConnectionStatus::Accepted => write!(f, "accepted"),
            LawyerConnectionStatus::Rejected => write!(f, "rejected"),
            LawyerConnectionStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for LawyerConnectionStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(LawyerConnectionStatus::Pending),
            "accepted" => Ok(LawyerConnectionStatus::Accepted),
            "rejected" => Ok(LawyerConnectionStatus::Rejected),
            "cancelled" => Ok(LawyerConnectionStatus::Cancelled),
            other => Err(format!("unknown lawyer connection status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    NewMessage,
    SummaryReady,
    LawyerResponse,
    LawyerAssigned,
    CaseUpdated,
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NotificationType::NewMessage => "new_message",
            NotificationType::SummaryReady => "summary_ready",
            NotificationType::LawyerResponse => "lawyer_response",
            NotificationType::LawyerAssigned => "lawyer_assigned",
            NotificationType::CaseUpdated => "case_updated",
        };
        write!(f, "{s}")
    }
}

impl FromStr for NotificationType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new_message" => Ok(NotificationType::NewMessage),
            "summary_ready" => Ok(NotificationType::SummaryReady),
            "lawyer_response" => Ok(NotificationType::LawyerResponse),
            "lawyer_assigned" => Ok(NotificationType::LawyerAssigned),
            "case_updated" => Ok(NotificationType::CaseUpdated),
            other => Err(format!("unknown notification type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub address: Option<String>,
    pub locale: String,
    pub timezone: Option<String>,
    pub push_token: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Structured case facts gathered across a conversation's turns. Each of
/// the five keys is an independent optional JSON object carrying a
/// `collected` flag plus domain fields — see GLOSSARY "5W".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FiveW {
    pub who: Option<Value>,
    pub what: Option<Value>,
    pub when: Option<Value>,
    pub where_: Option<Value>,
    pub why: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub status: ConversationStatus,
    pub current_agent: String,
    pub remote_conversation_handle: Option<String>,
    pub five_w: FiveW,
    pub analysis_done: bool,
    pub summary_generated: bool,
    pub wrapup_confirmed: bool,
    pub legal_area: Option<String>,
    pub case_strength: Option<String>,
    pub urgency: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub role: MessageRole,
    pub content: String,
    pub agent_name: Option<String>,
    pub function_call: Option<Value>,
    pub document_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub user_id: String,
    pub conversation_id: String,
    pub filename: String,
    pub mime_type: String,
    pub byte_size: i64,
    pub blob_key: Option<String>,
    pub download_url: Option<String>,
    pub upload_status: UploadStatus,
    pub ocr_status: OcrStatus,
    pub ocr_text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub id: String,
    pub conversation_id: String,
    pub user_id: String,
    pub markdown: String,
    pub reference_number: String,
    pub markdown_blob_key: String,
    pub pdf_blob_key: String,
    pub pdf_url: String,
    pub legal_area: Option<String>,
    pub case_strength: Option<String>,
    pub urgency: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LawyerConnection {
    pub id: String,
    pub user_id: String,
    pub conversation_id: String,
    pub summary_id: Option<String>,
    pub lawyer_id: String,
    pub lawyer_name: String,
    pub message: String,
    pub status: LawyerConnectionStatus,
    pub external_case_id: Option<String>,
    pub lawyer_response_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub notification_type: NotificationType,
    pub title: String,
    pub body: String,
    pub payload: Value,
    pub read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
