use std::sync::Arc;

use chrono::Utc;
use sumii_db::Db;
use sumii_protocol::sync::{SyncRequest, SyncResponse};
use tracing::instrument;

use crate::error::Result;

/// Thin wrapper turning a `Db::delta_sync` result into the wire shape
///. The watermark is the client's own clock, echoed back
/// verbatim by the client on its next call — the server never stores it.
#[instrument(skip(db))]
pub fn run(db: &Arc<Db>, user_id: &str, request: SyncRequest) -> Result<SyncResponse> {
    let server_time = Utc::now();
    match request.last_synced_at {
        None => {
            let epoch = chrono::DateTime::<Utc>::UNIX_EPOCH;
            let delta = db.delta_sync(user_id, epoch)?;
            Ok(SyncResponse {
                server_time,
                is_full_sync: true,
                conversations: delta.conversations,
                messages: delta.messages,
                documents: delta.documents,
                summaries: delta.summaries,
                notifications: delta.notifications,
                lawyer_connections: delta.lawyer_connections,
                deleted_ids: Default::default(),
            })
        }
        Some(watermark) => {
            let delta = db.delta_sync(user_id, watermark)?;
            Ok(SyncResponse {
                server_time,
                is_full_sync: false,
                conversations: delta.conversations,
                messages: delta.messages,
                documents: delta.documents,
                summaries: delta.summaries,
                notifications: delta.notifications,
                lawyer_connections: delta.lawyer_connections,
                deleted_ids: Default::default(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_sync_returns_everything_for_the_user() {
        let db = Arc::new(Db::open_in_memory().unwrap());
        let user = db.create_user("a@example.de", "de").unwrap();
        db.create_conversation(&user.id, "Erste Frage", "intake").unwrap();

        let response = run(&db, &user.id, SyncRequest { last_synced_at: None }).unwrap();
        assert!(response.is_full_sync);
        assert_eq!(response.conversations.len(), 1);
    }

    #[test]
    fn incremental_sync_after_full_sync_is_empty() {
        let db = Arc::new(Db::open_in_memory().unwrap());
        let user = db.create_user("a@example.de", "de").unwrap();
        db.create_conversation(&user.id, "Erste Frage", "intake").unwrap();

        let first = run(&db, &user.id, SyncRequest { last_synced_at: None }).unwrap();
        let second = run(&db, &user.id, SyncRequest { last_synced_at: Some(first.server_time) }).unwrap();
        assert!(!second.is_full_sync);
        assert!(second.conversations.is_empty());
    }
}
