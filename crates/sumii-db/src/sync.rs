use chrono::{DateTime, Utc};
use rusqlite::params;
use serde_json::Value;
use tracing::instrument;

use crate::error::Result;
use crate::Db;

/// One delta-sync pull across all seven entities. Rows are
/// returned as loose JSON rather than typed structs — the wire shape here
/// is a flattened projection of the row structs elsewhere in this crate,
/// and `sumii-protocol::sync::SyncResponse` is what actually types the
/// response at the HTTP boundary.
pub struct DeltaSyncResult {
    pub conversations: Vec<Value>,
    pub messages: Vec<Value>,
    pub documents: Vec<Value>,
    pub summaries: Vec<Value>,
    pub notifications: Vec<Value>,
    pub lawyer_connections: Vec<Value>,
}

impl Db {
    #[instrument(skip(self))]
    pub fn delta_sync(&self, user_id: &str, watermark: DateTime<Utc>) -> Result<DeltaSyncResult> {
        let conn = self.conn.lock().unwrap();

        let conversations = query_rows(
            &conn,
            "SELECT id, title, status, current_agent, remote_conversation_handle,
                    analysis_done, summary_generated, wrapup_confirmed,
                    legal_area, case_strength, urgency, created_at, updated_at
             FROM conversations WHERE user_id = ?1 AND updated_at > ?2 ORDER BY updated_at ASC",
            &[
                "id", "title", "status", "current_agent", "remote_conversation_handle",
                "analysis_done", "summary_generated", "wrapup_confirmed",
                "legal_area", "case_strength", "urgency", "created_at", "updated_at",
            ],
            params![user_id, watermark],
        )?;

        let messages = query_rows(
            &conn,
            "SELECT m.id, m.conversation_id, m.role, m.content, m.agent_name, m.document_ids, m.created_at
             FROM messages m JOIN conversations c ON c.id = m.conversation_id
             WHERE c.user_id = ?1 AND m.created_at > ?2 ORDER BY m.created_at ASC",
            &["id", "conversation_id", "role", "content", "agent_name", "document_ids", "created_at"],
            params![user_id, watermark],
        )?;

        let documents = query_rows(
            &conn,
            "SELECT id, conversation_id, filename, mime_type, byte_size, download_url,
                    upload_status, ocr_status, created_at, updated_at
             FROM documents WHERE user_id = ?1 AND (created_at > ?2 OR updated_at > ?2) ORDER BY created_at ASC",
            &[
                "id", "conversation_id", "filename", "mime_type", "byte_size", "download_url",
                "upload_status", "ocr_status", "created_at", "updated_at",
            ],
            params![user_id, watermark],
        )?;

        let summaries = query_rows(
            &conn,
            "SELECT id, conversation_id, reference_number, pdf_url, legal_area, case_strength, urgency, created_at
             FROM summaries WHERE user_id = ?1 AND created_at > ?2 ORDER BY created_at ASC",
            &["id", "conversation_id", "reference_number", "pdf_url", "legal_area", "case_strength", "urgency", "created_at"],
            params![user_id, watermark],
        )?;

        let notifications = query_rows(
            &conn,
            "SELECT id, notification_type, title, body, payload, read, read_at, created_at
             FROM notifications WHERE user_id = ?1 AND (created_at > ?2 OR read_at > ?2) ORDER BY created_at ASC",
            &["id", "notification_type", "title", "body", "payload", "read", "read_at", "created_at"],
            params![user_id, watermark],
        )?;

        let lawyer_connections = query_rows(
            &conn,
            "SELECT id, conversation_id, summary_id, lawyer_id, lawyer_name, status,
                    external_case_id, lawyer_response_at, created_at, updated_at
             FROM lawyer_connections WHERE user_id = ?1 AND updated_at > ?2 ORDER BY updated_at ASC",
            &[
                "id", "conversation_id", "summary_id", "lawyer_id", "lawyer_name", "status",
                "external_case_id", "lawyer_response_at", "created_at", "updated_at",
            ],
            params![user_id, watermark],
        )?;

        Ok(DeltaSyncResult {
            conversations,
            messages,
            documents,
            summaries,
            notifications,
            lawyer_connections,
        })
    }
}

/// Columns whose INTEGER storage is actually a boolean. SQLite has no
/// native bool type, so this has to be told rather than guessed from the
/// value — a `byte_size` of 0 or 1 is not a flag.
const BOOL_COLUMNS: &[&str] = &["analysis_done", "summary_generated", "wrapup_confirmed", "read"];

/// Run a query and project every returned row into a JSON object keyed by
/// `columns`, using SQLite's dynamic column typing to pick a JSON type.
fn query_rows(
    conn: &rusqlite::Connection,
    sql: &str,
    columns: &[&str],
    params: impl rusqlite::Params,
) -> Result<Vec<Value>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, |row| {
        let mut obj = serde_json::Map::new();
        for (i, name) in columns.iter().enumerate() {
            let value: Value = match row.get_ref(i)? {
                rusqlite::types::ValueRef::Null => Value::Null,
                rusqlite::types::ValueRef::Integer(n) => {
                    if BOOL_COLUMNS.contains(name) {
                        Value::from(n != 0)
                    } else {
                        Value::from(n)
                    }
                }
                rusqlite::types::ValueRef::Real(f) => Value::from(f),
                rusqlite::types::ValueRef::Text(t) => {
                    let s = String::from_utf8_lossy(t).to_string();
                    serde_json::from_str::<Value>(&s).unwrap_or(Value::String(s))
                }
                rusqlite::types::ValueRef::Blob(_) => Value::Null,
            };
            obj.insert((*name).to_string(), value);
        }
        Ok(Value::Object(obj))
    })?;
    rows.collect::<std::result::Result<Vec<_>, _>>().map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MessageRole;

    #[test]
    fn second_call_with_returned_watermark_is_empty() {
        let db = Db::open_in_memory().unwrap();
        let user = db.create_user("a@example.de", "de").unwrap();
        let conv = db.create_conversation(&user.id, "t", "router").unwrap();
        db.insert_message(&conv.id, MessageRole::User, "hi", None, None, &[]).unwrap();

        let t1 = Utc::now();
        let first = db.delta_sync(&user.id, DateTime::<Utc>::MIN_UTC).unwrap();
        assert!(!first.conversations.is_empty());
        assert!(!first.messages.is_empty());

        let second = db.delta_sync(&user.id, t1).unwrap();
        assert!(second.conversations.is_empty());
        assert!(second.messages.is_empty());
        assert!(second.notifications.is_empty());
    }

    #[test]
    fn sync_never_returns_another_users_rows() {
        let db = Db::open_in_memory().unwrap();
        let user_a = db.create_user("a@example.de", "de").unwrap();
        let user_b = db.create_user("b@example.de", "de").unwrap();
        db.create_conversation(&user_a.id, "a's case", "router").unwrap();

        let result = db.delta_sync(&user_b.id, DateTime::<Utc>::MIN_UTC).unwrap();
        assert!(result.conversations.is_empty());
    }
}
