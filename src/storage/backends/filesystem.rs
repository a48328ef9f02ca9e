use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use anyhow::anyhow;
use async_trait::async_trait;
use bytes::Bytes;

use crate::format::ImageKind;
use crate::storage::template::{BlobStore, StoredObject};

/// Objects are stored as plain files at `<directory>/<bucket>/<key>`.
///
/// There is no metadata on disk so the content type is derived from the
/// key's extension.
pub struct FileSystemBackend {
    directory: PathBuf,
}

impl FileSystemBackend {
    pub fn new(dir: PathBuf) -> Self {
        Self { directory: dir }
    }

    fn format_path(&self, bucket: &str, key: &str) -> anyhow::Result<PathBuf> {
        let relative = Path::new(bucket).join(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));

        if bucket.is_empty() || escapes {
            return Err(anyhow!("refusing to access {:?} outside of the store", relative));
        }

        Ok(self.directory.join(relative))
    }
}

fn content_type_for(key: &str) -> String {
    Path::new(key)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ImageKind::from_file_extension)
        .map(|kind| kind.as_mime().to_string())
        .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string())
}

#[async_trait]
impl BlobStore for FileSystemBackend {
    async fn fetch(&self, bucket: &str, key: &str) -> anyhow::Result<Option<StoredObject>> {
        let path = self.format_path(bucket, key)?;

        debug!("Retrieving object @ {:?}", &path);
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(StoredObject {
                data: Bytes::from(data),
                content_type: Some(content_type_for(key)),
            })),
            Err(ref e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(other) => Err(other.into()),
        }
    }

    async fn store(&self, bucket: &str, key: &str, _kind: ImageKind, data: Bytes) -> anyhow::Result<()> {
        let path = self.format_path(bucket, key)?;

        debug!("Storing object @ {:?}", &path);
        match tokio::fs::write(&path, &data).await {
            Ok(()) => Ok(()),
            Err(ref e) if e.kind() == ErrorKind::NotFound => {
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(&path, data).await?;
                Ok(())
            },
            Err(other) => Err(other.into()),
        }
    }
}
