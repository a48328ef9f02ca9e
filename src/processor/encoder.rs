use std::io::Cursor;

use bytes::Bytes;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::{DynamicImage, ImageEncoder, ImageOutputFormat};

use crate::errors::ResizeError;
use crate::format::ImageKind;

/// Encodes the image back into the kind it was loaded as.
///
/// Lossy kinds honour `quality`, PNG is written with the best compression
/// the encoder offers.
pub fn encode_to(img: &DynamicImage, kind: ImageKind, quality: u8) -> Result<Bytes, ResizeError> {
    let mut buff = Cursor::new(Vec::new());
    match kind {
        ImageKind::WebP => return encode_webp(img, quality),
        ImageKind::Jpeg => {
            // The jpeg encoder has no alpha support.
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            rgb.write_to(&mut buff, ImageOutputFormat::Jpeg(quality))?;
        },
        ImageKind::Png => {
            let encoder = PngEncoder::new_with_quality(&mut buff, CompressionType::Best, PngFilter::Adaptive);
            encoder.write_image(img.as_bytes(), img.width(), img.height(), img.color())?;
        },
        ImageKind::Gif | ImageKind::Tiff => {
            img.write_to(&mut buff, image::ImageFormat::from(kind))?;
        },
    }

    Ok(Bytes::from(buff.into_inner()))
}

fn encode_webp(img: &DynamicImage, quality: u8) -> Result<Bytes, ResizeError> {
    let converted = if img.color().has_alpha() {
        DynamicImage::ImageRgba8(img.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    };

    let encoder = webp::Encoder::from_image(&converted)
        .ok_or_else(|| ResizeError::Uncategorized(anyhow::anyhow!("webp encoder rejected pixel layout")))?;

    let encoded = encoder
        .encode(quality as f32)
        .map_err(|e| ResizeError::Uncategorized(e.into()))?;

    Ok(Bytes::copy_from_slice(&encoded))
}
