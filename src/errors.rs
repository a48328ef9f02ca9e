use thiserror::Error;

/// Every failure the edge transform can run into.
///
/// Each variant maps to exactly one HTTP outcome when the response is
/// finalized, see `response::ResponseOutcome`.
#[derive(Debug, Error)]
pub enum ResizeError {
    /// Bad query parameters, a malformed path or out of range dimensions.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The object does not exist in the blob store.
    #[error("object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// The object is not an image kind we know how to process.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// A transport or storage failure that is not a missing object.
    #[error("storage operation failed: {0}")]
    Operation(#[source] anyhow::Error),

    /// Codec faults and anything else nobody planned for.
    #[error("unexpected error: {0}")]
    Uncategorized(#[source] anyhow::Error),
}

impl ResizeError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Whether the failure was caused by the caller rather than by us.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest(_) | Self::NotFound { .. } | Self::UnsupportedFormat(_)
        )
    }
}

impl From<image::ImageError> for ResizeError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Unsupported(e) => Self::UnsupportedFormat(e.to_string()),
            other => Self::Uncategorized(other.into()),
        }
    }
}
