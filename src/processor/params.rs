use crate::errors::ResizeError;

/// The quality used when the request does not ask for one.
pub const DEFAULT_QUALITY: u8 = 80;

/// The widest image we will produce.
pub const MAX_WIDTH: i64 = 2000;

/// The tallest image we will produce.
pub const MAX_HEIGHT: i64 = 5000;

/// Resize parameters exactly as the request supplied them.
///
/// Values stay signed and unchecked until `validate` so out of range
/// input can be reported as a bad request instead of a parse error.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResizeParams {
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub quality: Option<i64>,
}

/// A validated resize operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeTarget {
    /// Both sides given, the aspect ratio is ignored.
    Exact { width: u32, height: u32 },

    /// One side given, shrink to fit while keeping the aspect ratio.
    Fit {
        width: Option<u32>,
        height: Option<u32>,
    },
}

impl ResizeParams {
    pub fn new(width: Option<i64>, height: Option<i64>, quality: Option<i64>) -> Self {
        Self {
            width,
            height,
            quality,
        }
    }

    /// Checks the requested dimensions and works out what to do with them.
    ///
    /// Every supplied dimension is checked on its own: it must be positive
    /// and within its ceiling whether or not the other side was given.
    /// Returns `None` when no resize was requested at all.
    pub fn validate(&self) -> Result<Option<ResizeTarget>, ResizeError> {
        let width = checked_dimension("width", self.width, MAX_WIDTH)?;
        let height = checked_dimension("height", self.height, MAX_HEIGHT)?;

        let target = match (width, height) {
            (None, None) => None,
            (Some(width), Some(height)) => Some(ResizeTarget::Exact { width, height }),
            (width, height) => Some(ResizeTarget::Fit { width, height }),
        };

        Ok(target)
    }

    /// The encoder quality, clamped into `1..=100`.
    pub fn effective_quality(&self) -> u8 {
        self.quality
            .map(|q| q.clamp(1, 100) as u8)
            .unwrap_or(DEFAULT_QUALITY)
    }

    pub fn is_resize_requested(&self) -> bool {
        self.width.is_some() || self.height.is_some()
    }
}

fn checked_dimension(name: &str, value: Option<i64>, max: i64) -> Result<Option<u32>, ResizeError> {
    match value {
        None => Ok(None),
        Some(v) if v <= 0 => Err(ResizeError::invalid(format!(
            "{} must be positive, got {}",
            name, v
        ))),
        Some(v) if v > max => Err(ResizeError::invalid(format!(
            "{} cannot be larger than {}px, got {}",
            name, max, v
        ))),
        Some(v) => Ok(Some(v as u32)),
    }
}
