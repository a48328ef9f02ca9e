use mime::Mime;
use strum::{EnumIter, IntoEnumIterator};

use crate::errors::ResizeError;

/// The closed set of image kinds the transform understands.
#[derive(Debug, Copy, Clone, Eq, PartialEq, EnumIter)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    WebP,
    Tiff,
}

impl ImageKind {
    pub fn as_mime(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::WebP => "image/webp",
            Self::Tiff => "image/tiff",
        }
    }

    /// Resolves a `Content-Type` value to an image kind.
    ///
    /// Parameters such as `; charset=binary` are ignored, anything outside
    /// of the known set is an `UnsupportedFormat` error rather than a default.
    pub fn from_mime(content_type: &str) -> Result<Self, ResizeError> {
        let unsupported =
            || ResizeError::UnsupportedFormat(format!("unsupported image format: {}", content_type));

        let parsed: Mime = content_type.trim().parse().map_err(|_| unsupported())?;
        let essence = parsed.essence_str().to_ascii_lowercase();

        Self::variants()
            .find(|kind| kind.as_mime() == essence)
            .ok_or_else(unsupported)
    }

    pub fn from_file_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::WebP),
            "tif" | "tiff" => Some(Self::Tiff),
            _ => None,
        }
    }

    pub fn variants() -> impl Iterator<Item = Self> {
        <Self as IntoEnumIterator>::iter()
    }
}

impl From<ImageKind> for image::ImageFormat {
    fn from(kind: ImageKind) -> Self {
        match kind {
            ImageKind::Jpeg => image::ImageFormat::Jpeg,
            ImageKind::Png => image::ImageFormat::Png,
            ImageKind::Gif => image::ImageFormat::Gif,
            ImageKind::WebP => image::ImageFormat::WebP,
            ImageKind::Tiff => image::ImageFormat::Tiff,
        }
    }
}

impl std::fmt::Display for ImageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_mime())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_mapping_is_a_bijection() {
        for kind in ImageKind::variants() {
            assert_eq!(ImageKind::from_mime(kind.as_mime()).unwrap(), kind);
        }

        let mut mimes: Vec<&str> = ImageKind::variants().map(|k| k.as_mime()).collect();
        mimes.sort_unstable();
        mimes.dedup();
        assert_eq!(mimes.len(), ImageKind::variants().count());
    }

    #[test]
    fn test_known_mime_strings() {
        assert_eq!(ImageKind::from_mime("image/jpeg").unwrap(), ImageKind::Jpeg);
        assert_eq!(ImageKind::from_mime("image/png").unwrap(), ImageKind::Png);
        assert_eq!(ImageKind::from_mime("image/gif").unwrap(), ImageKind::Gif);
        assert_eq!(ImageKind::from_mime("image/webp").unwrap(), ImageKind::WebP);
        assert_eq!(ImageKind::from_mime("image/tiff").unwrap(), ImageKind::Tiff);
        assert_eq!(ImageKind::from_mime("IMAGE/PNG").unwrap(), ImageKind::Png);
        assert_eq!(
            ImageKind::from_mime("image/jpeg; charset=binary").unwrap(),
            ImageKind::Jpeg
        );
    }

    #[test]
    fn test_unknown_mime_is_unsupported() {
        for raw in ["image/unsupported", "image/bmp", "application/octet-stream", "", "garbage"] {
            assert!(matches!(
                ImageKind::from_mime(raw),
                Err(ResizeError::UnsupportedFormat(_))
            ));
        }
    }

    #[test]
    fn test_file_extensions() {
        assert_eq!(ImageKind::from_file_extension("JPG"), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_file_extension("tif"), Some(ImageKind::Tiff));
        assert_eq!(ImageKind::from_file_extension("bmp"), None);
    }
}
