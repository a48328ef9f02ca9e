use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;

use crate::storage::template::BlobStore;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendConfigs {
    S3 {
        /// The AWS region the buckets live in, e.g. `ap-northeast-2`.
        region: String,

        /// An optional custom endpoint for S3 compatible stores.
        #[serde(default)]
        endpoint: Option<String>,
    },
    FileSystem {
        directory: PathBuf,
    },
}

impl BackendConfigs {
    pub fn connect(&self) -> anyhow::Result<Arc<dyn BlobStore>> {
        match self {
            Self::S3 { region, endpoint } => {
                let backend = super::blob_storage::BlobStorageBackend::new(region, endpoint.as_deref())?;
                Ok(Arc::new(backend))
            },
            Self::FileSystem { directory } => {
                Ok(Arc::new(super::filesystem::FileSystemBackend::new(directory.clone())))
            },
        }
    }
}
