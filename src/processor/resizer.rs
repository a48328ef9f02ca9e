use image::imageops::FilterType;
use image::DynamicImage;

use super::dimensions::{fill_missing, fit_within};
use super::params::ResizeTarget;

/// Bicubic sampling, the same trade-off most image libraries default to.
const FILTER: FilterType = FilterType::CatmullRom;

pub fn resize(img: DynamicImage, target: ResizeTarget) -> DynamicImage {
    match target {
        ResizeTarget::Exact { width, height } => {
            if img.width() == width && img.height() == height {
                return img;
            }
            img.resize_exact(width, height, FILTER)
        },
        ResizeTarget::Fit { width, height } => thumbnail(img, width, height),
    }
}

/// Shrinks the image to fit the requested box, filling the missing side
/// from the image itself. Images already inside the box are left alone.
fn thumbnail(img: DynamicImage, width: Option<u32>, height: Option<u32>) -> DynamicImage {
    let (src_w, src_h) = (img.width(), img.height());
    let (box_w, box_h) = fill_missing(src_w, src_h, width, height);
    let (dst_w, dst_h) = fit_within(src_w, src_h, box_w, box_h);

    if dst_w == src_w && dst_h == src_h {
        return img;
    }

    img.resize_exact(dst_w, dst_h, FILTER)
}
