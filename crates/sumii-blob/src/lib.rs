pub mod error;
pub mod keys;
pub mod null;
pub mod s3;

use std::time::Duration;

use async_trait::async_trait;

pub use error::{BlobError, Result};
pub use null::NullBlobStore;
pub use s3::S3BlobStore;

/// Object storage boundary. The storage service itself is out of scope, but
/// every document/summary artifact needs somewhere to
/// live. Keys are deterministic — see [`keys`] — so callers never need to
/// persist a generated key anywhere but the row that owns it.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// A time-limited, directly fetchable URL. Callers use a 7-day
    /// expiry (`sumii_core::config::PRESIGN_EXPIRY_DAYS`).
    async fn presigned_url(&self, key: &str, expiry: Duration) -> Result<String>;

    async fn delete(&self, key: &str) -> Result<()>;
}
