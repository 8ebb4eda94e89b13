use std::sync::Arc;

use chrono::Utc;
use sumii_blob::BlobStore;
use sumii_db::models::Summary;
use sumii_db::Db;
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use crate::email::EmailSender;
use crate::pdf::PdfRenderer;
use crate::reference_number;
use sumii_blob::keys;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error(transparent)]
    Db(#[from] sumii_db::DbError),

    #[error(transparent)]
    Blob(#[from] sumii_blob::BlobError),

    #[error(transparent)]
    Pdf(#[from] crate::pdf::PdfError),
}

impl From<ArtifactError> for sumii_core::SumiiError {
    fn from(e: ArtifactError) -> Self {
        match e {
            ArtifactError::Db(e) => e.into(),
            ArtifactError::Blob(e) => e.into(),
            ArtifactError::Pdf(e) => sumii_core::SumiiError::Internal(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ArtifactError>;

/// Structured metadata the summary-generation agent returns alongside the
/// markdown body.
pub struct SummaryMetadata {
    pub legal_area: Option<String>,
    pub case_strength: Option<String>,
    pub urgency: Option<String>,
}

/// Ties the remote-generated markdown to a durable, user-facing artifact
///: render the PDF, upload both forms, persist the Summary row
/// under the at-most-once-per-fingerprint guarantee, and best-effort email
/// a pointer. Grounded on
/// `examples/original_source/app/services/summary_service.py`'s step
/// order (generate → extract → persist).
pub struct SummaryPipeline {
    db: Arc<Db>,
    blob: Arc<dyn BlobStore>,
    pdf: Arc<PdfRenderer>,
    email: Arc<dyn EmailSender>,
    presign_expiry: std::time::Duration,
}

impl SummaryPipeline {
    pub fn new(
        db: Arc<Db>,
        blob: Arc<dyn BlobStore>,
        pdf: Arc<PdfRenderer>,
        email: Arc<dyn EmailSender>,
        presign_expiry: std::time::Duration,
    ) -> Self {
        Self { db, blob, pdf, email, presign_expiry }
    }

    #[instrument(skip(self, markdown, metadata))]
    pub async fn finalize(
        &self,
        conversation_id: &str,
        user_id: &str,
        markdown: &str,
        metadata: SummaryMetadata,
    ) -> Result<Summary> {
        // Idempotency happens inside `insert_summary` via the UNIQUE
        // constraint on `conversation_id`; a second caller racing this same
        // conversation gets the first writer's row back rather than a
        // duplicate. We still need a reference number and rendered PDF to
        // attempt the insert, so the happy path always does that work once,
        // and it's simply thrown away on the losing side of a race.
        let summary_id = Uuid::now_v7();
        let reference = reference_number::generate(summary_id, Utc::now().date_naive());

        let pdf_bytes = self.pdf.render(markdown, &reference, Utc::now())?;

        let markdown_key = keys::summary_markdown_key(&reference);
        let pdf_key = keys::summary_pdf_key(&reference);
        self.blob.put(&markdown_key, markdown.as_bytes().to_vec(), "text/markdown").await?;
        self.blob.put(&pdf_key, pdf_bytes, "application/pdf").await?;
        let pdf_url = self.blob.presigned_url(&pdf_key, self.presign_expiry).await?;

        let summary = self.db.insert_summary(
            conversation_id,
            user_id,
            markdown,
            &reference,
            &markdown_key,
            &pdf_key,
            &pdf_url,
            metadata.legal_area.as_deref(),
            metadata.case_strength.as_deref(),
            metadata.urgency.as_deref(),
        )?;

        self.db.mark_summary_generated(conversation_id)?;

        if let Some(user) = self.db.get_user(user_id)? {
            let html = crate::email::branded_email_html(
                "Ihre Zusammenfassung ist bereit",
                &format!("Ihre rechtliche Zusammenfassung {} wurde erstellt.", summary.reference_number),
                "Zusammenfassung ansehen",
                &summary.pdf_url,
            );
            if let Err(err) = self.email.send(&user.email, "Ihre Zusammenfassung ist bereit", &html).await {
                tracing::warn!(%err, user_id, "failed to send summary-ready email");
            }
        }

        Ok(summary)
    }

    /// Regeneration path: re-render and re-upload
    /// but keep the existing row/reference number rather than minting a new
    /// one.
    #[instrument(skip(self, markdown))]
    pub async fn regenerate(&self, summary_id: &str, markdown: &str) -> Result<Summary> {
        let existing = self
            .db
            .get_summary_unchecked(summary_id)?
            .ok_or_else(|| sumii_db::DbError::NotFound(format!("summary {summary_id}")))?;

        let pdf_bytes = self.pdf.render(markdown, &existing.reference_number, Utc::now())?;
        self.blob.put(&existing.markdown_blob_key, markdown.as_bytes().to_vec(), "text/markdown").await?;
        self.blob.put(&existing.pdf_blob_key, pdf_bytes, "application/pdf").await?;
        let pdf_url = self.blob.presigned_url(&existing.pdf_blob_key, self.presign_expiry).await?;

        Ok(self.db.update_summary_artifacts(
            summary_id,
            markdown,
            &existing.markdown_blob_key,
            &existing.pdf_blob_key,
            &pdf_url,
        )?)
    }
}
