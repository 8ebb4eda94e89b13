pub mod conversations;
pub mod documents;
pub mod error;
pub mod lawyer_connections;
pub mod messages;
pub mod models;
pub mod notifications;
pub mod schema;
pub mod summaries;
pub mod sync;
pub mod users;

use std::sync::Mutex;

use rusqlite::Connection;

pub use error::{DbError, Result};

/// Thread-safe handle onto the single relational store. Wraps one SQLite
/// connection in a `Mutex` — the one shared resource named by;
/// every unit of work below takes the lock for a single short statement or
/// transaction and never holds it across a remote-service call.
pub struct Db {
    pub(crate) conn: Mutex<Connection>,
}

impl Db {
    /// Wrap an already-open connection and ensure the schema exists.
    pub fn new(conn: Connection) -> Result<Self> {
        schema::init_db(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open (or create) the SQLite file at `path` and initialise its schema.
    pub fn open(path: &str) -> Result<Self> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let conn = Connection::open(path)?;
        Self::new(conn)
    }

    /// In-memory database for tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::new(Connection::open_in_memory()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_in_memory_and_initialises_schema() {
        let db = Db::open_in_memory().unwrap();
        let conn = db.conn.lock().unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type='table' AND name='users'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }
}
