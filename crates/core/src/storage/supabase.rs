use async_trait::async_trait;
use reqwest::Client;

use super::{Bucket, ObjectStore, StorageError, StoredObject};

/// Supabase Storage over its REST API, authenticated with the service-role
/// key.
#[derive(Debug, Clone)]
pub struct SupabaseStorage {
    client: Client,
    base_url: String,
    service_key: String,
}

impl SupabaseStorage {
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, service_key)
    }

    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        service_key: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            service_key: service_key.into(),
        }
    }

    fn object_url(&self, bucket: Bucket, key: &str) -> String {
        format!("{}/storage/v1/object/{bucket}/{key}", self.base_url)
    }

    /// Public URL of an object in a public bucket.
    pub fn public_url(&self, bucket: Bucket, key: &str) -> String {
        format!("{}/storage/v1/object/public/{bucket}/{key}", self.base_url)
    }
}

#[async_trait]
impl ObjectStore for SupabaseStorage {
    async fn put(
        &self,
        bucket: Bucket,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let size = bytes.len();
        let response = self
            .client
            .post(self.object_url(bucket, key))
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .header("x-upsert", "true")
            .header("cache-control", "max-age=3600")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!(%bucket, key, status = status.as_u16(), "Upload rejected by storage provider");
            return Err(StorageError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        tracing::info!(%bucket, key, size, "Object stored");
        Ok(StoredObject {
            url: self.public_url(bucket, key),
            path: key.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_object_and_public_urls() {
        let storage = SupabaseStorage::new("https://xyz.supabase.co/", "key");
        assert_eq!(
            storage.object_url(Bucket::Investimentos, "1-casa.jpg"),
            "https://xyz.supabase.co/storage/v1/object/investimentos/1-casa.jpg"
        );
        assert_eq!(
            storage.public_url(Bucket::Config, "2-logo.png"),
            "https://xyz.supabase.co/storage/v1/object/public/config/2-logo.png"
        );
    }
}
