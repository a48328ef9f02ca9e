use poem::http::{header, StatusCode};

use crate::errors::ResizeError;
use crate::event::{BodyEncoding, HeaderEntry, ResponseRecord};
use crate::format::ImageKind;

/// Transformed images never change, so they're cached for a year.
pub const CACHE_MAX_AGE: u64 = 31_536_000;

/// What a finished pipeline run turns into on the wire.
pub enum ResponseOutcome<B> {
    Success { body: B, kind: ImageKind },
    ClientError,
    NotFound,
    Passthrough,
    InternalError,
}

impl<B> ResponseOutcome<B> {
    pub fn new(body: B, result: Result<ImageKind, ResizeError>) -> Self {
        match result {
            Ok(kind) => Self::Success { body, kind },
            Err(ResizeError::InvalidRequest(_)) => Self::ClientError,
            Err(ResizeError::NotFound { .. }) => Self::NotFound,
            Err(ResizeError::UnsupportedFormat(_)) => Self::Passthrough,
            Err(ResizeError::Operation(_)) | Err(ResizeError::Uncategorized(_)) => Self::InternalError,
        }
    }

    /// The status this outcome responds with, `None` leaves the response as is.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Success { .. } => Some(StatusCode::OK),
            Self::ClientError => Some(StatusCode::BAD_REQUEST),
            Self::NotFound => Some(StatusCode::NOT_FOUND),
            Self::Passthrough => None,
            Self::InternalError => Some(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

/// Builds the final response from the pipeline result.
///
/// On success the body is base64 encoded alongside its `Content-Type` and a
/// year long `Cache-Control`. Errors only change the status, apart from an
/// unsupported format which hands back the upstream response untouched.
/// `body` is consumed on every path.
pub fn finalize<B: AsRef<[u8]>>(
    response: &ResponseRecord,
    body: B,
    result: Result<ImageKind, ResizeError>,
) -> ResponseRecord {
    let outcome = ResponseOutcome::new(body, result);
    let status = match outcome.status() {
        Some(status) => status,
        None => return response.clone(),
    };

    let mut finalized = with_status(response, status);
    if let ResponseOutcome::Success { body, kind } = outcome {
        finalized.body = Some(base64::encode(body.as_ref()));
        finalized.body_encoding = Some(BodyEncoding::Base64);
        finalized.headers.insert(
            header::CONTENT_TYPE.as_str().to_string(),
            vec![HeaderEntry::new("Content-Type", kind.as_mime())],
        );
        finalized.headers.insert(
            header::CACHE_CONTROL.as_str().to_string(),
            vec![HeaderEntry::new("Cache-Control", format!("max-age={}", CACHE_MAX_AGE))],
        );
    }

    finalized
}

fn with_status(response: &ResponseRecord, status: StatusCode) -> ResponseRecord {
    ResponseRecord {
        status: status.as_u16().to_string(),
        status_description: status.canonical_reason().map(|r| r.to_string()),
        ..response.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::anyhow;

    use super::*;

    fn response() -> ResponseRecord {
        let mut response = ResponseRecord::with_status(200);
        response.status_description = Some("OK".to_string());
        response.headers.insert(
            "x-cache".to_string(),
            vec![HeaderEntry::new("X-Cache", "Miss from cloudfront")],
        );
        response
    }

    fn buffer(data: &[u8]) -> (Arc<[u8]>, Arc<[u8]>) {
        let body: Arc<[u8]> = Arc::from(data);
        let watcher = body.clone();
        (body, watcher)
    }

    fn errors() -> Vec<ResizeError> {
        vec![
            ResizeError::invalid("width must be positive"),
            ResizeError::NotFound {
                bucket: "bucket".into(),
                key: "key".into(),
            },
            ResizeError::UnsupportedFormat("image/bmp".into()),
            ResizeError::Operation(anyhow!("timeout")),
            ResizeError::Uncategorized(anyhow!("boom")),
        ]
    }

    #[test]
    fn test_success_sets_status() {
        let actual = finalize(&response(), Vec::<u8>::new(), Ok(ImageKind::Jpeg));
        assert_eq!(actual.status, "200");
        assert_eq!(actual.status_description.as_deref(), Some("OK"));
    }

    #[test]
    fn test_success_sets_body_and_content_type() {
        let actual = finalize(&response(), b"\xFF\xD8\xFF".to_vec(), Ok(ImageKind::Jpeg));

        assert_eq!(actual.body.as_deref(), Some("/9j/"));
        assert_eq!(actual.body_encoding, Some(BodyEncoding::Base64));
        assert_eq!(
            actual.headers["content-type"],
            vec![HeaderEntry::new("Content-Type", "image/jpeg")]
        );
    }

    #[test]
    fn test_success_sets_cache_control() {
        let actual = finalize(&response(), Vec::<u8>::new(), Ok(ImageKind::Png));
        assert_eq!(
            actual.headers["cache-control"],
            vec![HeaderEntry::new("Cache-Control", "max-age=31536000")]
        );
        assert_eq!(actual.headers["x-cache"][0].value, "Miss from cloudfront");
    }

    #[test]
    fn test_content_type_follows_kind() {
        for kind in ImageKind::variants() {
            let actual = finalize(&response(), Vec::<u8>::new(), Ok(kind));
            assert_eq!(actual.headers["content-type"][0].value, kind.as_mime());
        }
    }

    #[test]
    fn test_invalid_request_is_bad_request() {
        let actual = finalize(&response(), Vec::<u8>::new(), Err(ResizeError::invalid("w")));
        assert_eq!(actual.status, "400");
        assert_eq!(actual.status_description.as_deref(), Some("Bad Request"));
        assert!(actual.body.is_none());
        assert!(!actual.headers.contains_key("cache-control"));
    }

    #[test]
    fn test_not_found() {
        let err = ResizeError::NotFound {
            bucket: "bucket".into(),
            key: "key".into(),
        };
        let actual = finalize(&response(), Vec::<u8>::new(), Err(err));
        assert_eq!(actual.status, "404");
    }

    #[test]
    fn test_unsupported_format_passes_through() {
        let expected = response();
        let actual = finalize(
            &expected,
            b"data".to_vec(),
            Err(ResizeError::UnsupportedFormat("image/bmp".into())),
        );
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_other_errors_are_internal() {
        let actual = finalize(&response(), Vec::<u8>::new(), Err(ResizeError::Operation(anyhow!("timeout"))));
        assert_eq!(actual.status, "500");

        let actual = finalize(&response(), Vec::<u8>::new(), Err(ResizeError::Uncategorized(anyhow!("boom"))));
        assert_eq!(actual.status, "500");
        assert_eq!(actual.status_description.as_deref(), Some("Internal Server Error"));
    }

    #[test]
    fn test_buffer_is_released_on_success() {
        let (body, watcher) = buffer(b"image");
        finalize(&response(), body, Ok(ImageKind::Png));
        assert_eq!(Arc::strong_count(&watcher), 1);
    }

    #[test]
    fn test_buffer_is_released_on_every_error() {
        for err in errors() {
            let (body, watcher) = buffer(b"image");
            finalize(&response(), body, Err(err));
            assert_eq!(Arc::strong_count(&watcher), 1);
        }
    }
}
