use std::sync::Arc;

use sumii_artifact::email::{branded_email_html, EmailSender};
use sumii_db::models::NotificationType;
use sumii_db::Db;
use sumii_protocol::webhook::{LawyerResponsePayload, WebhookResponse};
use tracing::instrument;

use crate::error::{OrchestratorError, Result};

/// Checks an inbound webhook's `X-Api-Key` header against the configured
/// shared secret. An empty configured secret accepts any provided key,
/// matching the development-mode bypass documented on `WebhooksConfig`.
pub fn verify_api_key(configured_secret: &str, provided_key: &str) -> bool {
    if configured_secret.is_empty() {
        return true;
    }
    configured_secret == provided_key
}

/// Lawyer-response webhook intake. Resolves and checks ownership of the
/// user/conversation named in the payload, updates the matching lawyer
/// connection if one exists (but proceeds even if none does), and always
/// creates the notification and attempts the best-effort email — the
/// caller (external system) has no retry semantics worth exercising.
pub struct WebhookHandler {
    pub db: Arc<Db>,
    pub signing_secret: String,
    pub email: Arc<dyn EmailSender>,
    pub link_base_url: String,
}

impl WebhookHandler {
    #[instrument(skip(self, provided_key))]
    pub fn authenticate(&self, provided_key: &str) -> Result<()> {
        if verify_api_key(&self.signing_secret, provided_key) {
            Ok(())
        } else {
            Err(OrchestratorError::InvalidWebhookSignature)
        }
    }

    #[instrument(skip(self, payload))]
    pub async fn handle_lawyer_response(&self, payload: LawyerResponsePayload) -> Result<WebhookResponse> {
        let user = self
            .db
            .get_user(&payload.user_id)?
            .ok_or_else(|| OrchestratorError::UserNotFound(payload.user_id.clone()))?;

        self.db.get_conversation(&payload.conversation_id, &payload.user_id)?;

        if let Some(connection) = self
            .db
            .find_lawyer_connection_by_conversation_and_lawyer(&payload.conversation_id, &payload.lawyer_id)?
        {
            self.db.record_lawyer_response(
                &connection.id,
                &payload.lawyer_name,
                &payload.case_id,
                payload.response_timestamp,
            )?;
        } else {
            tracing::warn!(
                conversation_id = %payload.conversation_id,
                lawyer_id = %payload.lawyer_id,
                "no lawyer connection found for webhook response, creating notification anyway"
            );
        }

        let notification = self.db.create_notification(
            &payload.user_id,
            NotificationType::LawyerResponse,
            "Anwalt hat geantwortet",
            &format!("Ihr Anwalt {} hat auf Ihren Fall geantwortet.", payload.lawyer_name),
            &serde_json::json!({
                "case_id": payload.case_id,
                "conversation_id": payload.conversation_id,
                "lawyer_id": payload.lawyer_id,
                "lawyer_name": payload.lawyer_name,
                "response_text": payload.response_text,
                "response_timestamp": payload.response_timestamp,
            }),
        )?;

        let case_summary_url = format!("{}/conversations/{}", self.link_base_url, payload.conversation_id);
        let html = branded_email_html(
            "Ihr Anwalt hat geantwortet",
            &format!("Ihr Anwalt {} hat auf Ihren Fall geantwortet.", payload.lawyer_name),
            "Antwort ansehen",
            &case_summary_url,
        );
        let email_sent = match self.email.send(&user.email, "Ihr Anwalt hat geantwortet", &html).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(%err, user_id = %payload.user_id, "failed to send lawyer-response email");
                false
            }
        };

        Ok(WebhookResponse::success(notification.id, email_sent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sumii_artifact::email::NullEmailSender;

    fn handler(db: Arc<Db>) -> WebhookHandler {
        WebhookHandler {
            db,
            signing_secret: String::new(),
            email: Arc::new(NullEmailSender),
            link_base_url: "https://app.sumii.de".to_string(),
        }
    }

    #[test]
    fn empty_secret_accepts_any_key() {
        assert!(verify_api_key("", "anything"));
        assert!(verify_api_key("", ""));
    }

    #[test]
    fn configured_secret_requires_exact_match() {
        assert!(verify_api_key("s3cret", "s3cret"));
        assert!(!verify_api_key("s3cret", "wrong"));
    }

    #[tokio::test]
    async fn unknown_user_is_reported() {
        let db = Arc::new(Db::open_in_memory().unwrap());
        let handler = handler(db);
        let payload = LawyerResponsePayload {
            case_id: "c1".into(),
            conversation_id: "missing-conv".into(),
            user_id: "missing-user".into(),
            lawyer_id: "l1".into(),
            lawyer_name: "Dr. Müller".into(),
            response_text: "Gerne helfe ich Ihnen.".into(),
            response_timestamp: chrono::Utc::now(),
        };
        let err = handler.handle_lawyer_response(payload).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn creates_notification_even_without_a_lawyer_connection() {
        let db = Arc::new(Db::open_in_memory().unwrap());
        let user = db.create_user("a@example.de", "de").unwrap();
        let conversation = db.create_conversation(&user.id, "Erstberatung", "intake").unwrap();
        let handler = handler(db.clone());

        let payload = LawyerResponsePayload {
            case_id: "c1".into(),
            conversation_id: conversation.id.clone(),
            user_id: user.id.clone(),
            lawyer_id: "l1".into(),
            lawyer_name: "Dr. Müller".into(),
            response_text: "Gerne helfe ich Ihnen.".into(),
            response_timestamp: chrono::Utc::now(),
        };
        let response = handler.handle_lawyer_response(payload).await.unwrap();
        assert_eq!(response.status, "success");

        let unread = db.list_unread(&user.id).unwrap();
        assert_eq!(unread.len(), 1);
    }

    #[tokio::test]
    async fn other_users_conversation_is_forbidden() {
        let db = Arc::new(Db::open_in_memory().unwrap());
        let owner = db.create_user("owner@example.de", "de").unwrap();
        let intruder = db.create_user("intruder@example.de", "de").unwrap();
        let conversation = db.create_conversation(&owner.id, "Erstberatung", "intake").unwrap();
        let handler = handler(db);

        let payload = LawyerResponsePayload {
            case_id: "c1".into(),
            conversation_id: conversation.id,
            user_id: intruder.id,
            lawyer_id: "l1".into(),
            lawyer_name: "Dr. Müller".into(),
            response_text: "Gerne helfe ich Ihnen.".into(),
            response_timestamp: chrono::Utc::now(),
        };
        let err = handler.handle_lawyer_response(payload).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::Db(sumii_db::DbError::Forbidden(_))));
    }
}
