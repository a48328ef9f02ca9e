use image::DynamicImage;
use libwebp_sys::*;
use std::fmt::{Debug, Error, Formatter};
use std::ops::Deref;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PixelLayout {
    Rgb,
    Rgba,
}

/// Returned when libwebp refuses to encode the given buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EncodeError;

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "libwebp failed to encode the image")
    }
}

impl std::error::Error for EncodeError {}

pub struct Encoder<'a> {
    layout: PixelLayout,
    image: &'a [u8],
    width: u32,
    height: u32,
}

impl<'a> Encoder<'a> {
    /// Creates a new encoder from the given image.
    ///
    /// Only 8 bit RGB and RGBA images can be handed to libwebp directly,
    /// anything else returns `None` and should be converted by the caller first.
    pub fn from_image(image: &'a DynamicImage) -> Option<Self> {
        match image {
            DynamicImage::ImageRgb8(image) => {
                Some(Self::from_rgb(image.as_ref(), image.width(), image.height()))
            },
            DynamicImage::ImageRgba8(image) => {
                Some(Self::from_rgba(image.as_ref(), image.width(), image.height()))
            },
            _ => None,
        }
    }

    /// Creates a new encoder from the given image data in the RGB pixel layout.
    pub fn from_rgb(image: &'a [u8], width: u32, height: u32) -> Self {
        Self { image, width, height, layout: PixelLayout::Rgb }
    }

    /// Creates a new encoder from the given image data in the RGBA pixel layout.
    pub fn from_rgba(image: &'a [u8], width: u32, height: u32) -> Self {
        Self { image, width, height, layout: PixelLayout::Rgba }
    }

    /// Encode the image with the given quality.
    /// The image quality must be between 0.0 and 100.0 inclusive for minimal
    /// and maximal quality respectively.
    pub fn encode(&self, quality: f32) -> Result<WebPMemory, EncodeError> {
        let quality = quality.clamp(0.0, 100.0);
        unsafe { encode(self.image, self.layout, self.width, self.height, quality) }
    }

    /// Encode the image losslessly.
    pub fn encode_lossless(&self) -> Result<WebPMemory, EncodeError> {
        unsafe { encode(self.image, self.layout, self.width, self.height, -1.0) }
    }
}

unsafe fn encode(
    image: &[u8],
    layout: PixelLayout,
    width: u32,
    height: u32,
    quality: f32,
) -> Result<WebPMemory, EncodeError> {
    let width = width as _;
    let height = height as _;
    let mut buffer = std::ptr::null_mut::<u8>();

    let len = match layout {
        PixelLayout::Rgb if quality < 0.0 => {
            let stride = width * 3;
            WebPEncodeLosslessRGB(image.as_ptr(), width, height, stride, &mut buffer as *mut _)
        },
        PixelLayout::Rgb => {
            let stride = width * 3;
            WebPEncodeRGB(image.as_ptr(), width, height, stride, quality, &mut buffer as *mut _)
        },
        PixelLayout::Rgba if quality < 0.0 => {
            let stride = width * 4;
            WebPEncodeLosslessRGBA(image.as_ptr(), width, height, stride, &mut buffer as *mut _)
        },
        PixelLayout::Rgba => {
            let stride = width * 4;
            WebPEncodeRGBA(image.as_ptr(), width, height, stride, quality, &mut buffer as *mut _)
        },
    };

    if len == 0 || buffer.is_null() {
        if !buffer.is_null() {
            WebPFree(buffer as _);
        }
        return Err(EncodeError);
    }

    Ok(WebPMemory(buffer, len))
}

/// This struct represents a safe wrapper around memory owned by libwebp.
/// Its data contents can be accessed through the Deref trait.
pub struct WebPMemory(pub(crate) *mut u8, pub(crate) usize);

impl Debug for WebPMemory {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        f.debug_struct("WebpMemory").field("len", &self.1).finish()
    }
}

impl Drop for WebPMemory {
    fn drop(&mut self) {
        unsafe { WebPFree(self.0 as _) }
    }
}

impl Deref for WebPMemory {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        unsafe { std::slice::from_raw_parts(self.0, self.1) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_rgb_lossy() {
        let img = DynamicImage::new_rgb8(16, 16);
        let encoder = Encoder::from_image(&img).expect("rgb8 is supported");
        let encoded = encoder.encode(75.0).expect("encode");

        assert_eq!(&encoded[0..4], b"RIFF");
        assert_eq!(&encoded[8..12], b"WEBP");
    }

    #[test]
    fn test_encode_rgba_lossless() {
        let img = DynamicImage::new_rgba8(8, 4);
        let encoder = Encoder::from_image(&img).expect("rgba8 is supported");
        let encoded = encoder.encode_lossless().expect("encode");

        assert_eq!(&encoded[0..4], b"RIFF");
    }

    #[test]
    fn test_unsupported_layout() {
        let img = DynamicImage::new_luma8(8, 8);
        assert!(Encoder::from_image(&img).is_none());
    }
}
