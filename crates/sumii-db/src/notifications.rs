use chrono::Utc;
use rusqlite::{params, Row};
use serde_json::Value;
use tracing::instrument;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Notification, NotificationType};
use crate::Db;

const NOTIFICATION_SELECT_SQL: &str = "SELECT id, user_id, notification_type, title, body, \
     payload, read, read_at, created_at FROM notifications";

fn row_to_notification(row: &Row<'_>) -> rusqlite::Result<Notification> {
    let notification_type: String = row.get(2)?;
    let payload_raw: String = row.get(5)?;
    Ok(Notification {
        id: row.get(0)?,
        user_id: row.get(1)?,
        notification_type: notification_type.parse().unwrap_or(NotificationType::NewMessage),
        title: row.get(3)?,
        body: row.get(4)?,
        payload: serde_json::from_str(&payload_raw).unwrap_or(Value::Null),
        read: row.get(6)?,
        read_at: row.get(7)?,
        created_at: row.get(8)?,
    })
}

impl Db {
    #[instrument(skip(self, payload))]
    pub fn create_notification(
        &self,
        user_id: &str,
        notification_type: NotificationType,
        title: &str,
        body: &str,
        payload: &Value,
    ) -> Result<Notification> {
        let conn = self.conn.lock().unwrap();
        let id = Uuid::now_v7().to_string();
        let now = Utc::now();
        conn.execute(
            "INSERT INTO notifications (id, user_id, notification_type, title, body, payload, read, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)",
            params![id, user_id, notification_type.to_string(), title, body, payload.to_string(), now],
        )?;
        drop(conn);
        self.get_notification(&id)?
            .ok_or_else(|| crate::error::DbError::NotFound(format!("notification {id} vanished after insert")))
    }

    #[instrument(skip(self))]
    pub fn get_notification(&self, id: &str) -> Result<Option<Notification>> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("{NOTIFICATION_SELECT_SQL} WHERE id = ?1");
        conn.query_row(&sql, params![id], row_to_notification)
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other.into()),
            })
    }

    /// Newest-first, unread only.
    #[instrument(skip(self))]
    pub fn list_unread(&self, user_id: &str) -> Result<Vec<Notification>> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("{NOTIFICATION_SELECT_SQL} WHERE user_id = ?1 AND read = 0 ORDER BY created_at DESC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![user_id], row_to_notification)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// `read` is monotonic — this statement is safe to
    /// call more than once for the same row; it never un-marks.
    #[instrument(skip(self))]
    pub fn mark_read(&self, id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE notifications SET read = 1, read_at = ?1 WHERE id = ?2 AND read = 0",
            params![Utc::now(), id],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unread_list_is_newest_first_and_mark_read_is_idempotent() {
        let db = Db::open_in_memory().unwrap();
        let user = db.create_user("a@example.de", "de").unwrap();
        let n1 = db
            .create_notification(&user.id, NotificationType::NewMessage, "t1", "b1", &serde_json::json!({}))
            .unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let n2 = db
            .create_notification(&user.id, NotificationType::SummaryReady, "t2", "b2", &serde_json::json!({}))
            .unwrap();

        let unread = db.list_unread(&user.id).unwrap();
        assert_eq!(unread[0].id, n2.id);
        assert_eq!(unread[1].id, n1.id);

        db.mark_read(&n1.id).unwrap();
        db.mark_read(&n1.id).unwrap(); // idempotent, no error
        let reloaded = db.get_notification(&n1.id).unwrap().unwrap();
        assert!(reloaded.read);
        assert!(reloaded.read_at.is_some());

        let unread_after = db.list_unread(&user.id).unwrap();
        assert_eq!(unread_after.len(), 1);
        assert_eq!(unread_after[0].id, n2.id);
    }
}
