use chrono::Utc;
use rusqlite::{params, Row};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{owned_or_forbidden, Result};
use crate::models::{Document, OcrStatus, UploadStatus};
use crate::Db;

const DOCUMENT_SELECT_SQL: &str = "SELECT id, user_id, conversation_id, filename, mime_type, \
     byte_size, blob_key, download_url, upload_status, ocr_status, ocr_text, created_at, updated_at \
     FROM documents";

fn row_to_document(row: &Row<'_>) -> rusqlite::Result<Document> {
    let upload_status: String = row.get(8)?;
    let ocr_status: String = row.get(9)?;
    Ok(Document {
        id: row.get(0)?,
        user_id: row.get(1)?,
        conversation_id: row.get(2)?,
        filename: row.get(3)?,
        mime_type: row.get(4)?,
        byte_size: row.get(5)?,
        blob_key: row.get(6)?,
        download_url: row.get(7)?,
        upload_status: upload_status.parse().unwrap_or(UploadStatus::Uploading),
        ocr_status: ocr_status.parse().unwrap_or(OcrStatus::Pending),
        ocr_text: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

impl Db {
    #[instrument(skip(self))]
    #[allow(clippy::too_many_arguments)]
    pub fn insert_document(
        &self,
        user_id: &str,
        conversation_id: &str,
        filename: &str,
        mime_type: &str,
        byte_size: i64,
        ocr_requested: bool,
    ) -> Result<Document> {
        let conn = self.conn.lock().unwrap();
        let id = Uuid::now_v7().to_string();
        let now = Utc::now();
        let ocr_status = if ocr_requested {
            OcrStatus::Pending
        } else {
            OcrStatus::Completed
        };
        conn.execute(
            "INSERT INTO documents
                (id, user_id, conversation_id, filename, mime_type, byte_size, upload_status, ocr_status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'uploading', ?7, ?8, ?8)",
            params![id, user_id, conversation_id, filename, mime_type, byte_size, ocr_status.to_string(), now],
        )?;
        drop(conn);
        self.get_document_unchecked(&id)?
            .ok_or_else(|| crate::error::DbError::NotFound(format!("document {id} vanished after insert")))
    }

    #[instrument(skip(self))]
    pub fn get_document_unchecked(&self, id: &str) -> Result<Option<Document>> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("{DOCUMENT_SELECT_SQL} WHERE id = ?1");
        conn.query_row(&sql, params![id], row_to_document)
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other.into()),
            })
    }

    #[instrument(skip(self))]
    pub fn get_document(&self, id: &str, requester_id: &str) -> Result<Document> {
        let row = self.get_document_unchecked(id)?;
        owned_or_forbidden(row, |d| &d.user_id, requester_id, "document")
    }

    /// Unknown/invalid/not-owned ids are silently
    /// dropped rather than surfaced as an error.
    #[instrument(skip(self))]
    pub fn get_owned_documents(&self, ids: &[String], requester_id: &str) -> Result<Vec<Document>> {
        let mut found = Vec::new();
        for id in ids {
            if let Some(doc) = self.get_document_unchecked(id)? {
                if doc.user_id == requester_id {
                    found.push(doc);
                }
            }
        }
        Ok(found)
    }

    #[instrument(skip(self))]
    pub fn list_documents_for_conversation(&self, conversation_id: &str) -> Result<Vec<Document>> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("{DOCUMENT_SELECT_SQL} WHERE conversation_id = ?1 ORDER BY created_at ASC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![conversation_id], row_to_document)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    #[instrument(skip(self))]
    pub fn mark_upload_completed(&self, id: &str, blob_key: &str, download_url: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE documents SET upload_status = 'completed', blob_key = ?1, download_url = ?2, updated_at = ?3 WHERE id = ?4",
            params![blob_key, download_url, Utc::now(), id],
        )?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn mark_upload_failed(&self, id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE documents SET upload_status = 'failed', updated_at = ?1 WHERE id = ?2",
            params![Utc::now(), id],
        )?;
        Ok(())
    }

    #[instrument(skip(self, text))]
    pub fn set_ocr_result(&self, id: &str, text: Option<&str>, status: OcrStatus) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE documents SET ocr_text = ?1, ocr_status = ?2, updated_at = ?3 WHERE id = ?4",
            params![text, status.to_string(), Utc::now(), id],
        )?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn patch_document(&self, id: &str, filename: Option<&str>) -> Result<Document> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE documents SET filename = COALESCE(?1, filename), updated_at = ?2 WHERE id = ?3",
            params![filename, Utc::now(), id],
        )?;
        drop(conn);
        self.get_document_unchecked(id)?
            .ok_or_else(|| crate::error::DbError::NotFound(format!("document {id}")))
    }

    #[instrument(skip(self))]
    pub fn delete_document(&self, id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM documents WHERE id = ?1", params![id])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_and_foreign_document_ids_are_silently_dropped() {
        let db = Db::open_in_memory().unwrap();
        let user_a = db.create_user("a@example.de", "de").unwrap();
        let user_b = db.create_user("b@example.de", "de").unwrap();
        let conv = db.create_conversation(&user_a.id, "t", "router").unwrap();
        let doc = db
            .insert_document(&user_a.id, &conv.id, "contract.pdf", "application/pdf", 1024, true)
            .unwrap();

        let ids = vec![doc.id.clone(), "unknown-id".to_string()];
        let found = db.get_owned_documents(&ids, &user_a.id).unwrap();
        assert_eq!(found.len(), 1);

        let found_for_b = db.get_owned_documents(&ids, &user_b.id).unwrap();
        assert!(found_for_b.is_empty());
    }

    #[test]
    fn completed_upload_requires_blob_key_invariant_is_upheld_by_caller() {
        let db = Db::open_in_memory().unwrap();
        let user = db.create_user("a@example.de", "de").unwrap();
        let conv = db.create_conversation(&user.id, "t", "router").unwrap();
        let doc = db
            .insert_document(&user.id, &conv.id, "x.png", "image/png", 10, false)
            .unwrap();
        db.mark_upload_completed(&doc.id, "users/u/conversations/c/documents/d/x.png", "https://x")
            .unwrap();
        let reloaded = db.get_document(&doc.id, &user.id).unwrap();
        assert_eq!(reloaded.upload_status, UploadStatus::Completed);
        assert!(reloaded.blob_key.is_some());
    }
}
