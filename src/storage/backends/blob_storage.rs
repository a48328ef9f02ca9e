use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use rusoto_core::{Region, RusotoError};
use rusoto_s3::{GetObjectError, GetObjectRequest, PutObjectRequest, S3Client, S3};

use crate::format::ImageKind;
use crate::storage::template::{BlobStore, StoredObject};

pub struct BlobStorageBackend {
    client: S3Client,
}

impl BlobStorageBackend {
    pub fn new(region: &str, endpoint: Option<&str>) -> Result<Self> {
        let region = match endpoint {
            Some(endpoint) => Region::Custom {
                name: region.to_string(),
                endpoint: endpoint.to_string(),
            },
            None => region
                .parse::<Region>()
                .map_err(|e| anyhow!("invalid s3 region {:?}: {}", region, e))?,
        };

        Ok(Self {
            client: S3Client::new(region),
        })
    }
}

#[async_trait]
impl BlobStore for BlobStorageBackend {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Option<StoredObject>> {
        debug!("Retrieving object in bucket @ {}/{}", bucket, key);

        let request = GetObjectRequest {
            bucket: bucket.to_string(),
            key: key.to_string(),
            ..Default::default()
        };

        let output = match self.client.get_object(request).await {
            Ok(output) => output,
            Err(e) if is_missing(&e) => return Ok(None),
            Err(e) => return Err(anyhow!("Remote storage bucket failed to get {}/{}: {}", bucket, key, e)),
        };

        let capacity = output.content_length.unwrap_or_default().max(0) as usize;
        let data = match output.body {
            Some(body) => {
                body.try_fold(Vec::with_capacity(capacity), |mut buff, chunk| async move {
                    buff.extend_from_slice(&chunk);
                    Ok(buff)
                })
                .await?
            },
            None => Vec::new(),
        };

        Ok(Some(StoredObject {
            data: Bytes::from(data),
            content_type: output.content_type,
        }))
    }

    async fn store(&self, bucket: &str, key: &str, kind: ImageKind, data: Bytes) -> Result<()> {
        debug!("Storing object in bucket @ {}/{}", bucket, key);

        let request = PutObjectRequest {
            bucket: bucket.to_string(),
            key: key.to_string(),
            body: Some(data.to_vec().into()),
            content_type: Some(kind.as_mime().to_string()),
            ..Default::default()
        };

        self.client
            .put_object(request)
            .await
            .map_err(|e| anyhow!("Remote storage bucket failed to put {}/{}: {}", bucket, key, e))?;

        Ok(())
    }
}

/// S3 reports a missing key as `NoSuchKey`, or as a bare 404 when the body
/// could not be parsed.
fn is_missing(err: &RusotoError<GetObjectError>) -> bool {
    match err {
        RusotoError::Service(GetObjectError::NoSuchKey(_)) => true,
        RusotoError::Unknown(response) => response.status.as_u16() == 404,
        _ => false,
    }
}
