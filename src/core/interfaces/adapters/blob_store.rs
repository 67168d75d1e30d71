use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::core::models::Identity;

/// One object to write into blob storage.
pub struct BlobUpload {
    pub key: String,
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub cache_ttl: Duration,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Writes the object, overwriting any existing object under the same key,
    /// and returns its public address.
    async fn put(&self, credentials: &Identity, upload: BlobUpload) -> Result<String>;

    fn public_address_for(&self, key: &str) -> String;
}
