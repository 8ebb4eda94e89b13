pub mod error;
pub mod sse;
pub mod sync;
pub mod turn;
pub mod webhook;

pub use error::{OrchestratorError, Result};
pub use sse::NotificationStream;
pub use turn::Turn;
pub use webhook::WebhookHandler;
