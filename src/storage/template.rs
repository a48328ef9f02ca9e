use async_trait::async_trait;
use bytes::Bytes;

use crate::format::ImageKind;

/// An object as it sits in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Bytes,

    /// The `Content-Type` the object was stored with, if any.
    pub content_type: Option<String>,
}

#[async_trait]
pub trait BlobStore: Sync + Send + 'static {
    /// Fetches an object, `None` if the key does not exist.
    async fn fetch(&self, bucket: &str, key: &str) -> anyhow::Result<Option<StoredObject>>;

    async fn store(&self, bucket: &str, key: &str, kind: ImageKind, data: Bytes) -> anyhow::Result<()>;
}
