pub mod anwalt;
pub mod conversations;
pub mod documents;
pub mod events;
pub mod health;
pub mod status;
pub mod summaries;
pub mod sync;
pub mod users;
pub mod webhooks;
