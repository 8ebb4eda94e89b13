use rusqlite::Connection;

use crate::error::Result;

/// Create all seven tables if they don't already exist. Safe to call on
/// every startup. Migrations themselves are out of scope; this
/// core owns its schema with a `CREATE TABLE IF NOT EXISTS` block per table
/// rather than a migration runner.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            email       TEXT NOT NULL UNIQUE,
            name        TEXT,
            address     TEXT,
            locale      TEXT NOT NULL DEFAULT 'de',
            timezone    TEXT,
            push_token  TEXT,
            latitude    REAL,
            longitude   REAL,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS conversations (
            id                         TEXT PRIMARY KEY,
            user_id                    TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            title                      TEXT NOT NULL,
            status                     TEXT NOT NULL DEFAULT 'active',
            current_agent              TEXT NOT NULL,
            remote_conversation_handle TEXT,
            five_w_who                 TEXT,
            five_w_what                TEXT,
            five_w_when                TEXT,
            five_w_where               TEXT,
            five_w_why                 TEXT,
            analysis_done              INTEGER NOT NULL DEFAULT 0,
            summary_generated          INTEGER NOT NULL DEFAULT 0,
            wrapup_confirmed           INTEGER NOT NULL DEFAULT 0,
            legal_area                 TEXT,
            case_strength               TEXT,
            urgency                    TEXT,
            created_at                 TEXT NOT NULL,
            updated_at                 TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_conversations_user
            ON conversations(user_id, updated_at DESC);

        CREATE TABLE IF NOT EXISTS messages (
            id              TEXT PRIMARY KEY,
            conversation_id TEXT NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
            role            TEXT NOT NULL,
            content         TEXT NOT NULL,
            agent_name      TEXT,
            function_call   TEXT,
            document_ids    TEXT NOT NULL DEFAULT '[]',
            created_at      TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_messages_conversation
            ON messages(conversation_id, created_at, id);

        CREATE TABLE IF NOT EXISTS documents (
            id              TEXT PRIMARY KEY,
            user_id         TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            conversation_id TEXT NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
            filename        TEXT NOT NULL,
            mime_type       TEXT NOT NULL,
            byte_size       INTEGER NOT NULL,
            blob_key        TEXT,
            download_url    TEXT,
            upload_status   TEXT NOT NULL DEFAULT 'uploading',
            ocr_status      TEXT NOT NULL DEFAULT 'pending',
            ocr_text        TEXT,
            created_at      TEXT NOT NULL,
            updated_at      TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_documents_conversation
            ON documents(conversation_id);
        CREATE INDEX IF NOT EXISTS idx_documents_user
            ON documents(user_id);

        CREATE TABLE IF NOT EXISTS summaries (
            id                 TEXT PRIMARY KEY,
            conversation_id    TEXT NOT NULL UNIQUE REFERENCES conversations(id) ON DELETE CASCADE,
            user_id            TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            markdown           TEXT NOT NULL,
            reference_number   TEXT NOT NULL,
            markdown_blob_key  TEXT NOT NULL,
            pdf_blob_key       TEXT NOT NULL,
            pdf_url            TEXT NOT NULL,
            legal_area         TEXT,
            case_strength      TEXT,
            urgency            TEXT,
            created_at         TEXT NOT NULL,
            updated_at         TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_summaries_user
            ON summaries(user_id);

        CREATE TABLE IF NOT EXISTS lawyer_connections (
            id                 TEXT PRIMARY KEY,
            user_id            TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            conversation_id    TEXT NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
            summary_id         TEXT REFERENCES summaries(id) ON DELETE SET NULL,
            lawyer_id          TEXT NOT NULL,
            lawyer_name        TEXT NOT NULL,
            message            TEXT NOT NULL,
            status             TEXT NOT NULL DEFAULT 'pending',
            external_case_id   TEXT,
            lawyer_response_at TEXT,
            created_at         TEXT NOT NULL,
            updated_at         TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_lawyer_connections_user
            ON lawyer_connections(user_id);
        CREATE INDEX IF NOT EXISTS idx_lawyer_connections_conv_lawyer
            ON lawyer_connections(conversation_id, lawyer_id);

        CREATE TABLE IF NOT EXISTS notifications (
            id                TEXT PRIMARY KEY,
            user_id           TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            notification_type TEXT NOT NULL,
            title             TEXT NOT NULL,
            body              TEXT NOT NULL,
            payload           TEXT NOT NULL DEFAULT '{}',
            read              INTEGER NOT NULL DEFAULT 0,
            read_at           TEXT,
            created_at        TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_notifications_user_unread
            ON notifications(user_id, read, created_at DESC);
        ",
    )?;
    Ok(())
}
