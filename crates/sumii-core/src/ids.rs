use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! opaque_id {
    ($name:ident) => {
        /// UUIDv7 — time-sortable, so rows also sort roughly by creation
        /// order and log correlation doesn't need a separate timestamp.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

opaque_id!(UserId);
opaque_id!(ConversationId);
opaque_id!(MessageId);
opaque_id!(DocumentId);
opaque_id!(SummaryId);
opaque_id!(LawyerConnectionId);
opaque_id!(NotificationId);

/// Parse a client-supplied id string, rejecting shapes that can't possibly
/// be a UUID. Document/conversation ids arrive in WS handshake query
/// strings and REST path params, both untyped at the wire.
pub fn parse_uuid(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}
