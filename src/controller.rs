use std::sync::Arc;

use anyhow::anyhow;
use bytes::Bytes;

use crate::errors::ResizeError;
use crate::event::{EdgeEvent, EdgeEventResult, EventType, RequestRecord, ResponseRecord};
use crate::format::ImageKind;
use crate::processor::{self, ResizeParams};
use crate::request::{self, ParsedRequest};
use crate::response::finalize;
use crate::storage::{self, BlobStore};

/// Handles edge events for every bucket behind the distribution.
///
/// The controller holds no per-request state and is shared behind an `Arc`.
pub struct EdgeController {
    storage: Arc<dyn BlobStore>,
    write_back_prefix: Option<String>,
}

impl EdgeController {
    pub fn new(storage: Arc<dyn BlobStore>, write_back_prefix: Option<String>) -> Self {
        Self {
            storage,
            write_back_prefix,
        }
    }

    /// Dispatches an event on its `eventType`.
    ///
    /// Viewer events are handed back untouched, the transform only runs
    /// between the cache and the origin.
    pub async fn handle(&self, event: EdgeEvent) -> anyhow::Result<EdgeEventResult> {
        let record = event
            .records
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("event contains no records"))?;

        let cf = record.cf;
        let result = match cf.config.event_type {
            EventType::OriginRequest => EdgeEventResult::Request(self.on_origin_request(cf.request)),
            EventType::OriginResponse => {
                let response = cf
                    .response
                    .ok_or_else(|| anyhow!("origin-response event is missing its response"))?;
                EdgeEventResult::Response(self.on_origin_response(&cf.request, response).await)
            },
            EventType::ViewerRequest => EdgeEventResult::Request(cf.request),
            EventType::ViewerResponse => match cf.response {
                Some(response) => EdgeEventResult::Response(response),
                None => return Err(anyhow!("viewer-response event is missing its response")),
            },
        };

        Ok(result)
    }

    pub fn on_origin_request(&self, request: RequestRecord) -> RequestRecord {
        request::take_resizing_hint(&request)
    }

    /// Runs the resize pipeline for a successful origin response.
    ///
    /// Anything other than a `200` from the origin is returned as-is.
    pub async fn on_origin_response(&self, request: &RequestRecord, response: ResponseRecord) -> ResponseRecord {
        if !response.is_ok() {
            debug!(status = %response.status, uri = %request.uri, "passing through non-200 origin response");
            return response;
        }

        match self.transform(request).await {
            Ok((data, kind)) => finalize(&response, data, Ok(kind)),
            Err(e) => {
                if e.is_client_error() {
                    warn!(uri = %request.uri, query = %request.querystring, "rejected image request: {}", e);
                } else {
                    error!(uri = %request.uri, query = %request.querystring, "failed to transform image: {:?}", e);
                }

                finalize(&response, Bytes::new(), Err(e))
            },
        }
    }

    async fn transform(&self, request: &RequestRecord) -> Result<(Bytes, ImageKind), ResizeError> {
        let parsed = request::parse(request)?;
        let (data, kind) = storage::load(self.storage.as_ref(), &parsed.bucket, &parsed.path).await?;

        let params = parsed.params;
        let data = tokio::task::spawn_blocking(move || processor::resize(data, kind, &params))
            .await
            .map_err(|e| ResizeError::Uncategorized(e.into()))??;

        if let Some(prefix) = self.write_back_prefix.as_deref() {
            if params.is_resize_requested() {
                let key = write_back_key(prefix, &parsed);
                storage::save(self.storage.as_ref(), &parsed.bucket, &key, kind, data.clone()).await?;
                debug!(bucket = %parsed.bucket, key = %key, "wrote resized image back");
            }
        }

        Ok((data, kind))
    }
}

/// `<prefix>/<w>x<h>/q<q>/<path>`, a missing side is written as `auto`.
fn write_back_key(prefix: &str, parsed: &ParsedRequest) -> String {
    let ResizeParams { width, height, .. } = parsed.params;
    let side = |v: Option<i64>| v.map(|v| v.to_string()).unwrap_or_else(|| "auto".to_string());

    format!(
        "{}/{}x{}/q{}/{}",
        prefix.trim_end_matches('/'),
        side(width),
        side(height),
        parsed.params.effective_quality(),
        parsed.path,
    )
}
