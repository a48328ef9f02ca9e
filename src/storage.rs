use bytes::Bytes;

use crate::errors::ResizeError;
use crate::format::ImageKind;

pub mod backends;
pub mod template;

pub use template::{BlobStore, StoredObject};

/// Loads an image and the kind it was declared as.
///
/// A missing key is `NotFound`, a backend failure is an `Operation` error
/// and a content type outside of the known set is `UnsupportedFormat`.
pub async fn load(store: &dyn BlobStore, bucket: &str, key: &str) -> Result<(Bytes, ImageKind), ResizeError> {
    let object = store
        .fetch(bucket, key)
        .await
        .map_err(ResizeError::Operation)?
        .ok_or_else(|| ResizeError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })?;

    let content_type = object.content_type.as_deref().unwrap_or_default();
    let kind = ImageKind::from_mime(content_type)?;

    Ok((object.data, kind))
}

/// Writes an image back to the store.
pub async fn save(
    store: &dyn BlobStore,
    bucket: &str,
    key: &str,
    kind: ImageKind,
    data: Bytes,
) -> Result<(), ResizeError> {
    store
        .store(bucket, key, kind, data)
        .await
        .map_err(ResizeError::Operation)
}
