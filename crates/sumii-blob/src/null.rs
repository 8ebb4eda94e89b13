use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{BlobError, Result};
use crate::BlobStore;

/// In-memory test double. Presigned URLs are a synthetic `mem://bucket/key`
/// rather than anything fetchable — orchestrator tests only assert that a
/// URL was produced and stored, not that it resolves.
#[derive(Default)]
pub struct NullBlobStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl NullBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for NullBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, _content_type: &str) -> Result<()> {
        self.objects.lock().unwrap().insert(key.to_string(), bytes);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| BlobError::NotFound(key.to_string()))
    }

    async fn presigned_url(&self, key: &str, _expiry: Duration) -> Result<String> {
        if !self.objects.lock().unwrap().contains_key(key) {
            return Err(BlobError::NotFound(key.to_string()));
        }
        Ok(format!("mem://sumii-test/{key}"))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trips_an_object() {
        let store = NullBlobStore::new();
        store.put("k", b"hello".to_vec(), "text/plain").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), b"hello");
        let url = store.presigned_url("k", Duration::from_secs(60)).await.unwrap();
        assert!(url.contains("k"));
        store.delete("k").await.unwrap();
        assert!(store.get("k").await.is_err());
    }
}
