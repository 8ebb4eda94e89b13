use chrono::Utc;
use rusqlite::{params, Row};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{owned_or_forbidden, DbError, Result};
use crate::models::Summary;
use crate::Db;

const SUMMARY_SELECT_SQL: &str = "SELECT id, conversation_id, user_id, markdown, reference_number, \
     markdown_blob_key, pdf_blob_key, pdf_url, legal_area, case_strength, urgency, created_at, updated_at \
     FROM summaries";

fn row_to_summary(row: &Row<'_>) -> rusqlite::Result<Summary> {
    Ok(Summary {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        user_id: row.get(2)?,
        markdown: row.get(3)?,
        reference_number: row.get(4)?,
        markdown_blob_key: row.get(5)?,
        pdf_blob_key: row.get(6)?,
        pdf_url: row.get(7)?,
        legal_area: row.get(8)?,
        case_strength: row.get(9)?,
        urgency: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

impl Db {
    #[instrument(skip(self))]
    pub fn get_summary_by_conversation(&self, conversation_id: &str) -> Result<Option<Summary>> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("{SUMMARY_SELECT_SQL} WHERE conversation_id = ?1");
        conn.query_row(&sql, params![conversation_id], row_to_summary)
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other.into()),
            })
    }

    #[instrument(skip(self))]
    pub fn get_summary_unchecked(&self, id: &str) -> Result<Option<Summary>> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("{SUMMARY_SELECT_SQL} WHERE id = ?1");
        conn.query_row(&sql, params![id], row_to_summary)
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other.into()),
            })
    }

    #[instrument(skip(self))]
    pub fn get_summary(&self, id: &str, requester_id: &str) -> Result<Summary> {
        let row = self.get_summary_unchecked(id)?;
        owned_or_forbidden(row, |s| &s.user_id, requester_id, "summary")
    }

    #[instrument(skip(self))]
    pub fn list_summaries(&self, user_id: &str) -> Result<Vec<Summary>> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("{SUMMARY_SELECT_SQL} WHERE user_id = ?1 ORDER BY created_at DESC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![user_id], row_to_summary)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Insert a new Summary row. The `conversation_id` UNIQUE constraint is
    /// the at-most-once-per-fingerprint guard: a racing second
    /// insert hits `SQLITE_CONSTRAINT_UNIQUE`, which the caller should
    /// translate into "return the existing row" by re-querying
    /// `get_summary_by_conversation` — this method surfaces the conflict
    /// rather than silently swallowing it so the pipeline can decide.
    #[instrument(skip(self, markdown))]
    #[allow(clippy::too_many_arguments)]
    pub fn insert_summary(
        &self,
        conversation_id: &str,
        user_id: &str,
        markdown: &str,
        reference_number: &str,
        markdown_blob_key: &str,
        pdf_blob_key: &str,
        pdf_url: &str,
        legal_area: Option<&str>,
        case_strength: Option<&str>,
        urgency: Option<&str>,
    ) -> Result<Summary> {
        let conn = self.conn.lock().unwrap();
        let id = Uuid::now_v7().to_string();
        let now = Utc::now();
        let insert_result = conn.execute(
            "INSERT INTO summaries
                (id, conversation_id, user_id, markdown, reference_number, markdown_blob_key,
                 pdf_blob_key, pdf_url, legal_area, case_strength, urgency, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
            params![
                id,
                conversation_id,
                user_id,
                markdown,
                reference_number,
                markdown_blob_key,
                pdf_blob_key,
                pdf_url,
                legal_area,
                case_strength,
                urgency,
                now,
            ],
        );
        drop(conn);

        match insert_result {
            Ok(_) => self
                .get_summary_unchecked(&id)?
                .ok_or_else(|| DbError::NotFound(format!("summary {id} vanished after insert"))),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                self.get_summary_by_conversation(conversation_id)?.ok_or_else(|| {
                    DbError::Conflict(format!(
                        "summary insert raced for conversation {conversation_id} but no row found on retry"
                    ))
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the blob keys/URL/markdown of an existing Summary for the
    /// regeneration path.
    #[instrument(skip(self, markdown))]
    pub fn update_summary_artifacts(
        &self,
        id: &str,
        markdown: &str,
        markdown_blob_key: &str,
        pdf_blob_key: &str,
        pdf_url: &str,
    ) -> Result<Summary> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE summaries SET markdown = ?1, markdown_blob_key = ?2, pdf_blob_key = ?3, pdf_url = ?4, updated_at = ?5 WHERE id = ?6",
            params![markdown, markdown_blob_key, pdf_blob_key, pdf_url, Utc::now(), id],
        )?;
        drop(conn);
        self.get_summary_unchecked(id)?
            .ok_or_else(|| DbError::NotFound(format!("summary {id}")))
    }

    #[instrument(skip(self))]
    pub fn patch_summary(&self, id: &str, legal_area: Option<&str>, case_strength: Option<&str>, urgency: Option<&str>) -> Result<Summary> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE summaries SET
                legal_area = COALESCE(?1, legal_area),
                case_strength = COALESCE(?2, case_strength),
                urgency = COALESCE(?3, urgency),
                updated_at = ?4
             WHERE id = ?5",
            params![legal_area, case_strength, urgency, Utc::now(), id],
        )?;
        drop(conn);
        self.get_summary_unchecked(id)?
            .ok_or_else(|| DbError::NotFound(format!("summary {id}")))
    }

    #[instrument(skip(self))]
    pub fn delete_summary(&self, id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM summaries WHERE id = ?1", params![id])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(db: &Db) -> (String, String) {
        let user = db.create_user("a@example.de", "de").unwrap();
        let conv = db.create_conversation(&user.id, "t", "router").unwrap();
        (user.id, conv.id)
    }

    #[test]
    fn second_insert_for_same_conversation_returns_existing_row() {
        let db = Db::open_in_memory().unwrap();
        let (user_id, conv_id) = seed(&db);

        let first = db
            .insert_summary(&conv_id, &user_id, "# a", "SUM-20250101-AAAAA", "summaries/x.md", "summaries/x.pdf", "https://x", None, None, None)
            .unwrap();
        let second = db
            .insert_summary(&conv_id, &user_id, "# b", "SUM-20250101-BBBBB", "summaries/y.md", "summaries/y.pdf", "https://y", None, None, None)
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.reference_number, "SUM-20250101-AAAAA");
    }
}
