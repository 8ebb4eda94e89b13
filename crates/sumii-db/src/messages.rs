use chrono::Utc;
use rusqlite::{params, Row};
use serde_json::Value;
use tracing::instrument;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Message, MessageRole};
use crate::Db;

const MESSAGE_SELECT_SQL: &str = "SELECT id, conversation_id, role, content, agent_name, \
     function_call, document_ids, created_at FROM messages";

fn row_to_message(row: &Row<'_>) -> rusqlite::Result<Message> {
    let role_str: String = row.get(2)?;
    let function_call_raw: Option<String> = row.get(5)?;
    let document_ids_raw: String = row.get(6)?;
    Ok(Message {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        role: role_str.parse().unwrap_or(MessageRole::User),
        content: row.get(3)?,
        agent_name: row.get(4)?,
        function_call: function_call_raw.and_then(|s| serde_json::from_str(&s).ok()),
        document_ids: serde_json::from_str(&document_ids_raw).unwrap_or_default(),
        created_at: row.get(7)?,
    })
}

impl Db {
    /// Messages are immutable once written — there is no update
    /// method, only insert and read.
    #[instrument(skip(self, content))]
    pub fn insert_message(
        &self,
        conversation_id: &str,
        role: MessageRole,
        content: &str,
        agent_name: Option<&str>,
        function_call: Option<&Value>,
        document_ids: &[String],
    ) -> Result<Message> {
        let conn = self.conn.lock().unwrap();
        let id = Uuid::now_v7().to_string();
        let now = Utc::now();
        conn.execute(
            "INSERT INTO messages (id, conversation_id, role, content, agent_name, function_call, document_ids, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                id,
                conversation_id,
                role.to_string(),
                content,
                agent_name,
                function_call.map(|v| v.to_string()),
                serde_json::to_string(document_ids)?,
                now,
            ],
        )?;
        drop(conn);
        self.get_message(&id)?
            .ok_or_else(|| crate::error::DbError::NotFound(format!("message {id} vanished after insert")))
    }

    #[instrument(skip(self))]
    pub fn get_message(&self, id: &str) -> Result<Option<Message>> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("{MESSAGE_SELECT_SQL} WHERE id = ?1");
        conn.query_row(&sql, params![id], row_to_message)
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other.into()),
            })
    }

    /// Ordering is creation timestamp with tie-break by id.
    #[instrument(skip(self))]
    pub fn list_messages(&self, conversation_id: &str) -> Result<Vec<Message>> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("{MESSAGE_SELECT_SQL} WHERE conversation_id = ?1 ORDER BY created_at ASC, id ASC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![conversation_id], row_to_message)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_order_by_created_at_then_id() {
        let db = Db::open_in_memory().unwrap();
        let user = db.create_user("a@example.de", "de").unwrap();
        let conv = db.create_conversation(&user.id, "t", "router").unwrap();

        db.insert_message(&conv.id, MessageRole::User, "first", None, None, &[])
            .unwrap();
        db.insert_message(&conv.id, MessageRole::Assistant, "second", Some("router"), None, &[])
            .unwrap();

        let msgs = db.list_messages(&conv.id).unwrap();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].content, "first");
        assert_eq!(msgs[1].role, MessageRole::Assistant);
    }
}
