use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::core::errors::PublishError;
use crate::core::interfaces::adapters::{BlobStore, BlobUpload};
use crate::core::models::{EncodedFrame, Identity, PublishedImage};
use crate::global_constants::{
    LOG_TAG_PUBLISH, PNG_CONTENT_TYPE, SCAN_KEY_EXTENSION, SCAN_KEY_PREFIX,
};

pub struct BlobPublisher {
    store: Arc<dyn BlobStore>,
    cache_ttl: Duration,
}

impl BlobPublisher {
    pub fn new(store: Arc<dyn BlobStore>, cache_ttl: Duration) -> Self {
        Self { store, cache_ttl }
    }

    /// `{identity}/scan_{unix_millis}.png`. Two captures by the same user in
    /// the same millisecond share a key and the later upload wins.
    pub fn storage_key_for(identity: &Identity, captured_at: DateTime<Utc>) -> String {
        format!(
            "{}/{}{}{}",
            identity.user_id,
            SCAN_KEY_PREFIX,
            captured_at.timestamp_millis(),
            SCAN_KEY_EXTENSION
        )
    }

    /// Consumes the frame; its bytes are dropped once the upload finishes.
    pub async fn publish(
        &self,
        identity: &Identity,
        frame: EncodedFrame,
        captured_at: DateTime<Utc>,
    ) -> Result<PublishedImage, PublishError> {
        let storage_key = Self::storage_key_for(identity, captured_at);

        log::info!(
            "{} uploading {} bytes as {}",
            LOG_TAG_PUBLISH,
            frame.size_in_bytes(),
            storage_key
        );

        let upload = BlobUpload {
            key: storage_key.clone(),
            bytes: frame.into_bytes(),
            content_type: PNG_CONTENT_TYPE,
            cache_ttl: self.cache_ttl,
        };

        let public_address = self
            .store
            .put(identity, upload)
            .await
            .map_err(|error| PublishError {
                storage_key: storage_key.clone(),
                reason: format!("{:#}", error),
            })?;

        log::info!("{} published at {}", LOG_TAG_PUBLISH, public_address);

        Ok(PublishedImage::new(storage_key, public_address))
    }
}
