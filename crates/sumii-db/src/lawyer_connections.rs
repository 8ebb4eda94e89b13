use chrono::{DateTime, Utc};
use rusqlite::{params, Row};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{owned_or_forbidden, Result};
use crate::models::{LawyerConnection, LawyerConnectionStatus};
use crate::Db;

const LAWYER_CONNECTION_SELECT_SQL: &str = "SELECT id, user_id, conversation_id, summary_id, \
     lawyer_id, lawyer_name, message, status, external_case_id, lawyer_response_at, created_at, updated_at \
     FROM lawyer_connections";

fn row_to_lawyer_connection(row: &Row<'_>) -> rusqlite::Result<LawyerConnection> {
    let status: String = row.get(7)?;
    Ok(LawyerConnection {
        id: row.get(0)?,
        user_id: row.get(1)?,
        conversation_id: row.get(2)?,
        summary_id: row.get(3)?,
        lawyer_id: row.get(4)?,
        lawyer_name: row.get(5)?,
        message: row.get(6)?,
        status: status.parse().unwrap_or(LawyerConnectionStatus::Pending),
        external_case_id: row.get(8)?,
        lawyer_response_at: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

impl Db {
    #[instrument(skip(self))]
    pub fn create_lawyer_connection(
        &self,
        user_id: &str,
        conversation_id: &str,
        summary_id: Option<&str>,
        lawyer_id: &str,
        lawyer_name: &str,
        message: &str,
    ) -> Result<LawyerConnection> {
        let conn = self.conn.lock().unwrap();
        let id = Uuid::now_v7().to_string();
        let now = Utc::now();
        conn.execute(
            "INSERT INTO lawyer_connections
                (id, user_id, conversation_id, summary_id, lawyer_id, lawyer_name, message, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'pending', ?8, ?8)",
            params![id, user_id, conversation_id, summary_id, lawyer_id, lawyer_name, message, now],
        )?;
        drop(conn);
        self.get_lawyer_connection_unchecked(&id)?
            .ok_or_else(|| crate::error::DbError::NotFound(format!("lawyer connection {id} vanished after insert")))
    }

    #[instrument(skip(self))]
    pub fn get_lawyer_connection_unchecked(&self, id: &str) -> Result<Option<LawyerConnection>> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("{LAWYER_CONNECTION_SELECT_SQL} WHERE id = ?1");
        conn.query_row(&sql, params![id], row_to_lawyer_connection)
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other.into()),
            })
    }

    #[instrument(skip(self))]
    pub fn get_lawyer_connection(&self, id: &str, requester_id: &str) -> Result<LawyerConnection> {
        let row = self.get_lawyer_connection_unchecked(id)?;
        owned_or_forbidden(row, |c| &c.user_id, requester_id, "lawyer connection")
    }

    /// Used by the webhook handler to find the row to update.
    #[instrument(skip(self))]
    pub fn find_lawyer_connection_by_conversation_and_lawyer(
        &self,
        conversation_id: &str,
        lawyer_id: &str,
    ) -> Result<Option<LawyerConnection>> {
        let conn = self.conn.lock().unwrap();
        let sql = format!(
            "{LAWYER_CONNECTION_SELECT_SQL} WHERE conversation_id = ?1 AND lawyer_id = ?2 ORDER BY created_at DESC LIMIT 1"
        );
        conn.query_row(&sql, params![conversation_id, lawyer_id], row_to_lawyer_connection)
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other.into()),
            })
    }

    #[instrument(skip(self))]
    pub fn list_lawyer_connections(&self, user_id: &str) -> Result<Vec<LawyerConnection>> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("{LAWYER_CONNECTION_SELECT_SQL} WHERE user_id = ?1 ORDER BY created_at DESC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![user_id], row_to_lawyer_connection)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Accept the response, only forward-transitioning
    /// status, refreshing the cached lawyer name, and binding the external
    /// case id the first time it's seen.
    #[instrument(skip(self))]
    pub fn record_lawyer_response(
        &self,
        id: &str,
        lawyer_name: &str,
        case_id: &str,
        response_at: DateTime<Utc>,
    ) -> Result<LawyerConnection> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE lawyer_connections SET
                status = 'accepted',
                lawyer_response_at = ?1,
                lawyer_name = ?2,
                external_case_id = COALESCE(external_case_id, ?3),
                updated_at = ?4
             WHERE id = ?5",
            params![response_at, lawyer_name, case_id, Utc::now(), id],
        )?;
        drop(conn);
        self.get_lawyer_connection_unchecked(id)?
            .ok_or_else(|| crate::error::DbError::NotFound(format!("lawyer connection {id}")))
    }

    /// Binds the sumii-anwalt case id returned by the handoff call (spec
    /// §4.3 step 4). Distinct from [`Db::record_lawyer_response`]: this
    /// runs right after connection creation, before the lawyer has
    /// actually responded, so it must not touch `status` or
    /// `lawyer_response_at`.
    #[instrument(skip(self))]
    pub fn bind_external_case_id(&self, id: &str, case_id: &str) -> Result<LawyerConnection> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE lawyer_connections SET external_case_id = COALESCE(external_case_id, ?1), updated_at = ?2 WHERE id = ?3",
            params![case_id, Utc::now(), id],
        )?;
        drop(conn);
        self.get_lawyer_connection_unchecked(id)?
            .ok_or_else(|| crate::error::DbError::NotFound(format!("lawyer connection {id}")))
    }

    #[instrument(skip(self))]
    pub fn set_lawyer_connection_status(&self, id: &str, status: LawyerConnectionStatus) -> Result<LawyerConnection> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE lawyer_connections SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.to_string(), Utc::now(), id],
        )?;
        drop(conn);
        self.get_lawyer_connection_unchecked(id)?
            .ok_or_else(|| crate::error::DbError::NotFound(format!("lawyer connection {id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lawyer_response_only_moves_status_forward() {
        let db = Db::open_in_memory().unwrap();
        let user = db.create_user("a@example.de", "de").unwrap();
        let conv = db.create_conversation(&user.id, "t", "router").unwrap();
        let conn = db
            .create_lawyer_connection(&user.id, &conv.id, None, "lawyer-1", "Dr. X", "bitte melden")
            .unwrap();

        let updated = db
            .record_lawyer_response(&conn.id, "Dr. X. Müller", "case-123", Utc::now())
            .unwrap();
        assert_eq!(updated.status, LawyerConnectionStatus::Accepted);
        assert_eq!(updated.external_case_id.as_deref(), Some("case-123"));

        // A second response does not clobber the already-bound case id.
        let updated_again = db
            .record_lawyer_response(&conn.id, "Dr. X. Müller", "case-999", Utc::now())
            .unwrap();
        assert_eq!(updated_again.external_case_id.as_deref(), Some("case-123"));
    }
}
