use bytes::Bytes;
use image::load_from_memory_with_format;

use crate::errors::ResizeError;
use crate::format::ImageKind;

pub mod dimensions;
pub mod encoder;
pub mod params;
pub mod resizer;

pub use params::ResizeParams;

/// Resizes and re-encodes an image according to the request parameters.
///
/// Without a width or height the input buffer is handed straight back and
/// is never decoded. Otherwise the image is decoded as `kind`, resized and
/// encoded again as `kind` with the effective quality. The input buffer is
/// dropped as soon as it has been decoded.
pub fn resize(data: Bytes, kind: ImageKind, params: &ResizeParams) -> Result<Bytes, ResizeError> {
    let target = match params.validate()? {
        Some(target) => target,
        None => return Ok(data),
    };

    let img = load_from_memory_with_format(data.as_ref(), kind.into())?;
    drop(data);

    let (src_w, src_h) = (img.width(), img.height());
    let resized = resizer::resize(img, target);
    debug!(
        kind = %kind,
        from = ?(src_w, src_h),
        to = ?(resized.width(), resized.height()),
        "resized image"
    );

    encoder::encode_to(&resized, kind, params.effective_quality())
}
