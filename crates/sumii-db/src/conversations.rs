use chrono::Utc;
use rusqlite::{params, Row};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{owned_or_forbidden, Result};
use crate::models::{Conversation, ConversationStatus, FiveW};
use crate::Db;

const CONVERSATION_SELECT_SQL: &str = "SELECT id, user_id, title, status, current_agent, \
     remote_conversation_handle, five_w_who, five_w_what, five_w_when, five_w_where, five_w_why, \
     analysis_done, summary_generated, wrapup_confirmed, legal_area, case_strength, urgency, \
     created_at, updated_at FROM conversations";

fn row_to_conversation(row: &Row<'_>) -> rusqlite::Result<Conversation> {
    let status_str: String = row.get(3)?;
    let parse_json = |col: usize| -> rusqlite::Result<Option<serde_json::Value>> {
        let raw: Option<String> = row.get(col)?;
        Ok(raw.and_then(|s| serde_json::from_str(&s).ok()))
    };
    Ok(Conversation {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        status: status_str.parse().unwrap_or(ConversationStatus::Active),
        current_agent: row.get(4)?,
        remote_conversation_handle: row.get(5)?,
        five_w: FiveW {
            who: parse_json(6)?,
            what: parse_json(7)?,
            when: parse_json(8)?,
            where_: parse_json(9)?,
            why: parse_json(10)?,
        },
        analysis_done: row.get(11)?,
        summary_generated: row.get(12)?,
        wrapup_confirmed: row.get(13)?,
        legal_area: row.get(14)?,
        case_strength: row.get(15)?,
        urgency: row.get(16)?,
        created_at: row.get(17)?,
        updated_at: row.get(18)?,
    })
}

impl Db {
    #[instrument(skip(self))]
    pub fn create_conversation(&self, user_id: &str, title: &str, initial_agent: &str) -> Result<Conversation> {
        let conn = self.conn.lock().unwrap();
        let id = Uuid::now_v7().to_string();
        let now = Utc::now();
        conn.execute(
            "INSERT INTO conversations (id, user_id, title, status, current_agent, created_at, updated_at)
             VALUES (?1, ?2, ?3, 'active', ?4, ?5, ?5)",
            params![id, user_id, title, initial_agent, now],
        )?;
        drop(conn);
        self.get_conversation_unchecked(&id)?
            .ok_or_else(|| crate::error::DbError::NotFound(format!("conversation {id} vanished after insert")))
    }

    /// Fetch without ownership enforcement — for internal callers (e.g. the
    /// webhook, which resolves by id before explicitly checking ownership
    /// itself step 4).
    #[instrument(skip(self))]
    pub fn get_conversation_unchecked(&self, id: &str) -> Result<Option<Conversation>> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("{CONVERSATION_SELECT_SQL} WHERE id = ?1");
        conn.query_row(&sql, params![id], row_to_conversation)
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other.into()),
            })
    }

    /// Fetch enforcing ownership: absent row → not-found, row owned
    /// by someone else → forbidden.
    #[instrument(skip(self))]
    pub fn get_conversation(&self, id: &str, requester_id: &str) -> Result<Conversation> {
        let row = self.get_conversation_unchecked(id)?;
        owned_or_forbidden(row, |c| &c.user_id, requester_id, "conversation")
    }

    #[instrument(skip(self))]
    pub fn list_conversations(&self, user_id: &str) -> Result<Vec<Conversation>> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("{CONVERSATION_SELECT_SQL} WHERE user_id = ?1 ORDER BY updated_at DESC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![user_id], row_to_conversation)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    #[instrument(skip(self))]
    pub fn set_remote_handle(&self, conversation_id: &str, handle: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE conversations SET remote_conversation_handle = ?1, updated_at = ?2 WHERE id = ?3",
            params![handle, Utc::now(), conversation_id],
        )?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn set_current_agent(&self, conversation_id: &str, agent: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE conversations SET current_agent = ?1, updated_at = ?2 WHERE id = ?3",
            params![agent, Utc::now(), conversation_id],
        )?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn touch_updated_at(&self, conversation_id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE conversations SET updated_at = ?1 WHERE id = ?2",
            params![Utc::now(), conversation_id],
        )?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn update_five_w(&self, conversation_id: &str, five_w: &FiveW) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE conversations SET
                five_w_who = ?1, five_w_what = ?2, five_w_when = ?3,
                five_w_where = ?4, five_w_why = ?5, updated_at = ?6
             WHERE id = ?7",
            params![
                five_w.who.as_ref().map(|v| v.to_string()),
                five_w.what.as_ref().map(|v| v.to_string()),
                five_w.when.as_ref().map(|v| v.to_string()),
                five_w.where_.as_ref().map(|v| v.to_string()),
                five_w.why.as_ref().map(|v| v.to_string()),
                Utc::now(),
                conversation_id,
            ],
        )?;
        Ok(())
    }

    /// Patch title/status directly (REST `PATCH /conversations/{id}`).
    #[instrument(skip(self))]
    pub fn patch_conversation(
        &self,
        conversation_id: &str,
        title: Option<&str>,
        status: Option<&ConversationStatus>,
    ) -> Result<Conversation> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE conversations SET
                title = COALESCE(?1, title),
                status = COALESCE(?2, status),
                updated_at = ?3
             WHERE id = ?4",
            params![title, status.map(|s| s.to_string()), Utc::now(), conversation_id],
        )?;
        drop(conn);
        self.get_conversation_unchecked(conversation_id)?
            .ok_or_else(|| crate::error::DbError::NotFound(format!("conversation {conversation_id}")))
    }

    #[instrument(skip(self))]
    pub fn delete_conversation(&self, conversation_id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM conversations WHERE id = ?1", params![conversation_id])?;
        Ok(())
    }

    /// Idempotent transition to `completed` —
    #[instrument(skip(self))]
    pub fn mark_summary_generated(&self, conversation_id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE conversations SET
                summary_generated = 1,
                status = CASE WHEN status = 'active' THEN 'completed' ELSE status END,
                updated_at = ?1
             WHERE id = ?2",
            params![Utc::now(), conversation_id],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_db() -> (Db, String) {
        let db = Db::open_in_memory().unwrap();
        let user = db.create_user("a@example.de", "de").unwrap();
        (db, user.id)
    }

    #[test]
    fn ownership_distinguishes_forbidden_from_not_found() {
        let (db, user_a) = seeded_db();
        let user_b = db.create_user("b@example.de", "de").unwrap().id;
        let conv = db.create_conversation(&user_a, "Heizung kaputt", "router").unwrap();

        assert!(db.get_conversation(&conv.id, &user_a).is_ok());
        let err = db.get_conversation(&conv.id, &user_b).unwrap_err();
        assert!(matches!(err, crate::error::DbError::Forbidden(_)));

        let err = db.get_conversation("does-not-exist", &user_a).unwrap_err();
        assert!(matches!(err, crate::error::DbError::NotFound(_)));
    }

    #[test]
    fn mark_summary_generated_is_idempotent_transition() {
        let (db, user_id) = seeded_db();
        let conv = db.create_conversation(&user_id, "x", "router").unwrap();
        db.mark_summary_generated(&conv.id).unwrap();
        let reloaded = db.get_conversation(&conv.id, &user_id).unwrap();
        assert!(reloaded.summary_generated);
        assert_eq!(reloaded.status, ConversationStatus::Completed);

        // Calling it again must not error or move status backwards.
        db.mark_summary_generated(&conv.id).unwrap();
        let reloaded_again = db.get_conversation(&conv.id, &user_id).unwrap();
        assert_eq!(reloaded_again.status, ConversationStatus::Completed);
    }
}
