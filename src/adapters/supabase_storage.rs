use anyhow::Result;
use async_trait::async_trait;

use crate::adapters::supabase_errors::failure_message;
use crate::core::interfaces::adapters::{BlobStore, BlobUpload};
use crate::core::models::Identity;

pub struct SupabaseStorage {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    bucket: String,
}

impl SupabaseStorage {
    pub fn new(base_url: &str, anon_key: &str, bucket: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            bucket: bucket.to_string(),
        }
    }

    fn encoded_key(key: &str) -> String {
        key.split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }

    fn object_endpoint(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            urlencoding::encode(&self.bucket),
            Self::encoded_key(key)
        )
    }
}

#[async_trait]
impl BlobStore for SupabaseStorage {
    async fn put(&self, credentials: &Identity, upload: BlobUpload) -> Result<String> {
        let endpoint = self.object_endpoint(&upload.key);
        log::info!(
            "[SUPABASE_STORAGE] Uploading {} bytes to {}",
            upload.bytes.len(),
            endpoint
        );

        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(&credentials.access_token)
            .header("apikey", &self.anon_key)
            .header(reqwest::header::CONTENT_TYPE, upload.content_type)
            .header(
                reqwest::header::CACHE_CONTROL,
                format!("max-age={}", upload.cache_ttl.as_secs()),
            )
            .header("x-upsert", "true")
            .body(upload.bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("[SUPABASE_STORAGE] Upload rejected ({}): {}", status, body);
            anyhow::bail!(failure_message(status.as_u16(), &body));
        }

        let public_address = self.public_address_for(&upload.key);
        log::debug!("[SUPABASE_STORAGE] Stored object at {}", public_address);
        Ok(public_address)
    }

    fn public_address_for(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            urlencoding::encode(&self.bucket),
            Self::encoded_key(key)
        )
    }
}
