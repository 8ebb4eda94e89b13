use chrono::Utc;
use rusqlite::{params, Row};
use tracing::instrument;
use uuid::Uuid;

use crate::error::Result;
use crate::models::User;
use crate::Db;

const USER_SELECT_SQL: &str = "SELECT id, email, name, address, locale, timezone, push_token, \
     latitude, longitude, created_at, updated_at FROM users";

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        address: row.get(3)?,
        locale: row.get(4)?,
        timezone: row.get(5)?,
        push_token: row.get(6)?,
        latitude: row.get(7)?,
        longitude: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

impl Db {
    /// Create a user row. Registration itself is an external concern (spec
    /// §1); this is the seam the boundary auth service calls after it
    /// mints credentials, and what webhook/sync lookups join against.
    #[instrument(skip(self))]
    pub fn create_user(&self, email: &str, locale: &str) -> Result<User> {
        let conn = self.conn.lock().unwrap();
        let id = Uuid::now_v7().to_string();
        let now = Utc::now();
        conn.execute(
            "INSERT INTO users (id, email, locale, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4)",
            params![id, email, locale, now],
        )?;
        drop(conn);
        self.get_user(&id)?.ok_or_else(|| {
            crate::error::DbError::NotFound(format!("user {id} vanished after insert"))
        })
    }

    #[instrument(skip(self))]
    pub fn get_user(&self, id: &str) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("{USER_SELECT_SQL} WHERE id = ?1");
        conn.query_row(&sql, params![id], row_to_user)
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other.into()),
            })
    }

    #[instrument(skip(self))]
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("{USER_SELECT_SQL} WHERE email = ?1");
        conn.query_row(&sql, params![email], row_to_user)
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other.into()),
            })
    }

    #[instrument(skip(self))]
    pub fn set_push_token(&self, user_id: &str, token: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE users SET push_token = ?1, updated_at = ?2 WHERE id = ?3",
            params![token, Utc::now(), user_id],
        )?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn update_profile(
        &self,
        user_id: &str,
        name: Option<&str>,
        address: Option<&str>,
        timezone: Option<&str>,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<User> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE users SET
                name = COALESCE(?1, name),
                address = COALESCE(?2, address),
                timezone = COALESCE(?3, timezone),
                latitude = COALESCE(?4, latitude),
                longitude = COALESCE(?5, longitude),
                updated_at = ?6
             WHERE id = ?7",
            params![name, address, timezone, latitude, longitude, Utc::now(), user_id],
        )?;
        drop(conn);
        self.get_user(user_id)?
            .ok_or_else(|| crate::error::DbError::NotFound(format!("user {user_id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_fetch_user_round_trip() {
        let db = Db::open_in_memory().unwrap();
        let user = db.create_user("client@example.de", "de").unwrap();
        assert_eq!(user.locale, "de");

        let fetched = db.get_user(&user.id).unwrap().unwrap();
        assert_eq!(fetched.email, "client@example.de");

        let by_email = db.get_user_by_email("client@example.de").unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
    }

    #[test]
    fn unknown_user_is_none_not_error() {
        let db = Db::open_in_memory().unwrap();
        assert!(db.get_user("does-not-exist").unwrap().is_none());
    }
}
