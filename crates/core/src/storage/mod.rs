//! Storage Upload Adapter: turns a base64 image payload into a durable
//! public URL in an object-storage bucket.

pub mod filename;
pub mod memory;
pub mod supabase;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::content::ValidationError;

pub use filename::{content_type_for, object_key, sanitize_filename};
pub use memory::MemoryObjectStore;
pub use supabase::SupabaseStorage;

/// Largest accepted decoded upload.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Buckets an upload may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Carrossel,
    Investimentos,
    Config,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Carrossel => "carrossel",
            Bucket::Investimentos => "investimentos",
            Bucket::Config => "config",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Bucket {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "carrossel" => Ok(Bucket::Carrossel),
            "investimentos" => Ok(Bucket::Investimentos),
            "config" => Ok(Bucket::Config),
            other => Err(ValidationError::UnknownBucket(other.to_string())),
        }
    }
}

/// Body of `storage.uploadFile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UploadRequest {
    pub bucket: Bucket,
    pub filename: String,
    /// Raw base64, or a `data:<mime>;base64,` URL.
    pub file_base64: String,
}

impl UploadRequest {
    /// Decode the payload, accepting an optional data-URL prefix.
    pub fn decode(&self) -> Result<Vec<u8>, ValidationError> {
        let encoded = match self.file_base64.split_once(";base64,") {
            Some((prefix, data)) if prefix.starts_with("data:") => data,
            _ => self.file_base64.as_str(),
        };
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|_| ValidationError::InvalidBase64)?;
        if bytes.is_empty() {
            return Err(ValidationError::EmptyFile);
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(ValidationError::FileTooLarge {
                size: bytes.len(),
                max: MAX_UPLOAD_BYTES,
            });
        }
        Ok(bytes)
    }
}

/// Where an upload ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    /// Absolute public URL to persist on the record.
    pub url: String,
    /// Object key inside the bucket.
    pub path: String,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is not configured")]
    NotConfigured,

    #[error("storage request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("storage provider returned {status}: {message}")]
    Provider { status: u16, message: String },
}

/// An object-storage provider.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `bytes` under `key`, replacing any existing object, and return
    /// its public location.
    async fn put(
        &self,
        bucket: Bucket,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(payload: &str) -> UploadRequest {
        UploadRequest {
            bucket: Bucket::Carrossel,
            filename: "foto.png".to_string(),
            file_base64: payload.to_string(),
        }
    }

    #[test]
    fn decodes_raw_and_data_url_payloads() {
        assert_eq!(request("aGVsbG8=").decode().unwrap(), b"hello");
        assert_eq!(
            request("data:image/png;base64,aGVsbG8=").decode().unwrap(),
            b"hello"
        );
    }

    #[test]
    fn rejects_bad_payloads() {
        assert_eq!(request("not base64!").decode(), Err(ValidationError::InvalidBase64));
        assert_eq!(request("").decode(), Err(ValidationError::EmptyFile));
    }

    #[test]
    fn size_limit_is_inclusive() {
        let at_limit = STANDARD.encode(vec![7u8; MAX_UPLOAD_BYTES]);
        assert_eq!(request(&at_limit).decode().unwrap().len(), MAX_UPLOAD_BYTES);

        let over = STANDARD.encode(vec![7u8; MAX_UPLOAD_BYTES + 1]);
        assert_eq!(
            request(&over).decode(),
            Err(ValidationError::FileTooLarge {
                size: MAX_UPLOAD_BYTES + 1,
                max: MAX_UPLOAD_BYTES,
            })
        );
    }

    #[test]
    fn bucket_is_a_closed_set() {
        assert_eq!("config".parse::<Bucket>().unwrap(), Bucket::Config);
        assert!("avatars".parse::<Bucket>().is_err());
        let body = r#"{"bucket":"avatars","filename":"a.png","fileBase64":"aGk="}"#;
        assert!(serde_json::from_str::<UploadRequest>(body).is_err());
    }
}
