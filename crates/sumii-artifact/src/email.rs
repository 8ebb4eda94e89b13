use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("failed to build message: {0}")]
    Build(String),

    #[error("smtp transport error: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, EmailError>;

/// Best-effort notification email boundary, grounded
/// on `examples/original_source/app/services/email_service.py`'s
/// branded-HTML-email contract. A send failure here never fails the
/// caller's pipeline — callers log and move on, the same way the original
/// swallows SES errors.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<()>;
}

pub struct SmtpEmailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpEmailSender {
    pub fn new(relay: &str, username: &str, password: &str, from: impl Into<String>) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(relay)
            .map_err(|e| EmailError::Transport(e.to_string()))?
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .build();
        Ok(Self { transport, from: from.into() })
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<()> {
        let message = Message::builder()
            .from(self.from.parse().map_err(|e: lettre::address::AddressError| EmailError::Build(e.to_string()))?)
            .to(to.parse().map_err(|e: lettre::address::AddressError| EmailError::Build(e.to_string()))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| EmailError::Build(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| EmailError::Transport(e.to_string()))?;
        Ok(())
    }
}

/// Swallows everything — used when no SMTP relay is configured (dev) and
/// in tests.
#[derive(Default)]
pub struct NullEmailSender;

#[async_trait]
impl EmailSender for NullEmailSender {
    async fn send(&self, to: &str, subject: &str, _html_body: &str) -> Result<()> {
        warn!(to, subject, "email sender disabled, dropping message");
        Ok(())
    }
}

/// The branded HTML wrapper shared by every notification email this
/// service sends — lawyer-response confirmation, summary-ready pointer.
pub fn branded_email_html(title: &str, message: &str, cta_text: &str, cta_url: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="de">
<head><meta charset="UTF-8"></head>
<body style="margin:0;padding:0;font-family:'Figtree','Inter',sans-serif;background-color:#f8fafc;">
  <table role="presentation" style="width:100%;border-collapse:collapse;">
    <tr><td align="center" style="padding:40px 20px;">
      <table role="presentation" style="width:100%;max-width:600px;background-color:#ffffff;border-radius:16px;overflow:hidden;">
        <tr><td style="background:linear-gradient(135deg,#34495e 0%,#7b8d9f 100%);padding:40px 30px;text-align:center;">
          <p style="margin:0;font-size:14px;color:rgba(255,255,255,0.8);letter-spacing:1px;">SUMII</p>
        </td></tr>
        <tr><td style="padding:40px 30px;">
          <h2 style="margin:0 0 16px 0;font-size:24px;font-weight:600;color:#34495e;">{title}</h2>
          <p style="margin:0 0 24px 0;font-size:16px;line-height:1.6;color:#4a5568;">{message}</p>
          <table role="presentation" style="width:100%;margin:24px 0;"><tr><td align="center">
            <a href="{cta_url}" style="display:inline-block;padding:16px 40px;background:linear-gradient(135deg,#34495e 0%,#7b8d9f 100%);color:#ffffff;font-size:16px;font-weight:600;text-decoration:none;border-radius:10px;">{cta_text}</a>
          </td></tr></table>
        </td></tr>
      </table>
    </td></tr>
  </table>
</body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn null_sender_never_errors() {
        let sender = NullEmailSender;
        sender.send("user@example.de", "Test", "<p>hi</p>").await.unwrap();
    }

    #[test]
    fn branded_html_embeds_title_and_cta() {
        let html = branded_email_html("Titel", "Nachricht", "Ansehen", "https://example.de");
        assert!(html.contains("Titel"));
        assert!(html.contains("https://example.de"));
    }
}
