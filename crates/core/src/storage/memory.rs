use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{Bucket, ObjectStore, StorageError, StoredObject};

/// A stored object kept by [`MemoryObjectStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Keeps uploads in memory and serves them under a fixed base URL.
#[derive(Debug)]
pub struct MemoryObjectStore {
    base_url: String,
    objects: Mutex<HashMap<(Bucket, String), MemoryObject>>,
}

impl MemoryObjectStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            objects: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, bucket: Bucket, key: &str) -> Option<MemoryObject> {
        self.objects.lock().get(&(bucket, key.to_string())).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new("memory://storage")
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(
        &self,
        bucket: Bucket,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        self.objects.lock().insert(
            (bucket, key.to_string()),
            MemoryObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(StoredObject {
            url: format!("{}/{bucket}/{key}", self.base_url),
            path: key.to_string(),
        })
    }
}
