use std::sync::Arc;
use std::time::Duration;

use sumii_db::Db;
use sumii_protocol::sse::NotificationEvent;
use tracing::instrument;

const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// A rendered notification still waiting to be marked read. Holding the
/// frame and its source id apart lets the caller flush the frame to the
/// wire first and only mark it read once that flush has actually
/// succeeded — never the other way around.
pub struct NotificationFrame {
    pub id: String,
    pub frame: String,
}

/// Notification push loop: every tick, drain the user's unread
/// notifications and render each as an SSE frame. Marking a notification
/// read is a separate step ([`NotificationStream::mark_delivered`]) the
/// caller performs only after the frame has actually reached the client.
pub struct NotificationStream {
    db: Arc<Db>,
    user_id: String,
}

impl NotificationStream {
    pub fn new(db: Arc<Db>, user_id: String) -> Self {
        Self { db, user_id }
    }

    /// Polls once, returning rendered SSE frames for every notification
    /// unread at the time of the call. Does not mark anything read — call
    /// [`NotificationStream::mark_delivered`] per frame after it has been
    /// written to the wire.
    #[instrument(skip(self))]
    pub fn poll_once(&self) -> sumii_db::error::Result<Vec<NotificationFrame>> {
        let unread = self.db.list_unread(&self.user_id)?;
        let mut frames = Vec::with_capacity(unread.len());
        for notification in unread {
            let event = NotificationEvent {
                notification_type: notification.notification_type.to_string(),
                title: notification.title,
                message: notification.body,
                data: notification.payload,
            };
            if let Ok(frame) = event.to_sse_frame() {
                frames.push(NotificationFrame { id: notification.id, frame });
            }
        }
        Ok(frames)
    }

    /// Marks a single notification read. Call only after its frame from
    /// [`NotificationStream::poll_once`] has actually been flushed to the
    /// client — a connection that drops before the flush leaves the
    /// notification unread so it is redelivered on the next poll, the
    /// documented at-least-once tradeoff.
    #[instrument(skip(self))]
    pub fn mark_delivered(&self, notification_id: &str) -> sumii_db::error::Result<()> {
        self.db.mark_read(notification_id)
    }

    /// Runs `poll_once` on a fixed interval, forwarding each batch of frames
    /// to `on_frames` and marking each one delivered only once `on_frames`
    /// returns, until the connection's cancellation token fires.
    pub async fn run(
        &self,
        mut on_frames: impl FnMut(&[NotificationFrame]),
        cancel: tokio_util::sync::CancellationToken,
    ) {
        let mut ticker = tokio::time::interval(POLL_INTERVAL);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    match self.poll_once() {
                        Ok(frames) if !frames.is_empty() => {
                            on_frames(&frames);
                            for frame in &frames {
                                if let Err(err) = self.mark_delivered(&frame.id) {
                                    tracing::warn!(%err, user_id = %self.user_id, "failed to mark notification delivered");
                                }
                            }
                        }
                        Ok(_) => {}
                        Err(err) => tracing::warn!(%err, user_id = %self.user_id, "notification poll failed"),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sumii_db::models::NotificationType;

    #[test]
    fn poll_once_does_not_mark_read_until_delivered() {
        let db = Arc::new(Db::open_in_memory().unwrap());
        let user = db.create_user("a@example.de", "de").unwrap();
        db.create_notification(&user.id, NotificationType::SummaryReady, "t", "b", &serde_json::json!({})).unwrap();

        let stream = NotificationStream::new(db.clone(), user.id.clone());
        let frames = stream.poll_once().unwrap();
        assert_eq!(frames.len(), 1);
        assert!(frames[0].frame.starts_with("event: summary_ready\n"));

        // a second poll before delivery is confirmed still returns the same notification
        let undelivered_again = stream.poll_once().unwrap();
        assert_eq!(undelivered_again.len(), 1);

        stream.mark_delivered(&frames[0].id).unwrap();
        let after_delivery = stream.poll_once().unwrap();
        assert!(after_delivery.is_empty());
    }
}
