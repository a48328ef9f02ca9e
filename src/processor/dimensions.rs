/// Fills in the side the request left out with the image's own size.
pub fn fill_missing(
    src_w: u32,
    src_h: u32,
    width: Option<u32>,
    height: Option<u32>,
) -> (u32, u32) {
    (width.unwrap_or(src_w), height.unwrap_or(src_h))
}

/// The largest size that fits inside the box while keeping the aspect
/// ratio. Never larger than the source, never smaller than 1px.
pub fn fit_within(src_w: u32, src_h: u32, box_w: u32, box_h: u32) -> (u32, u32) {
    let scale_w = box_w as f64 / src_w as f64;
    let scale_h = box_h as f64 / src_h as f64;
    let scale = scale_w.min(scale_h).min(1.0);

    let new_w = (src_w as f64 * scale).round() as u32;
    let new_h = (src_h as f64 * scale).round() as u32;

    (new_w.clamp(1, box_w.max(1)), new_h.clamp(1, box_h.max(1)))
}
