use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma, Rgba, RgbaImage};
use imageproc::map::map_colors;

pub const DEFAULT_THRESHOLD: i32 = 60;

// Used when a threshold falls outside 0..=255
const FALLBACK_THRESHOLD: u8 = 128;

// Preprocessing
//------------------------------------------------------------------------------

/// Rec.601 luma of the alpha-premultiplied color, so transparent areas read as black.
pub fn grayscale(src: &DynamicImage) -> GrayImage {
    map_colors(&src.to_rgba8(), |Rgba([r, g, b, a])| {
        let pm = |c: u8| c as u32 * a as u32 / 255;
        let y = (19595 * pm(r) + 38470 * pm(g) + 7471 * pm(b) + (1 << 15)) >> 16;
        Luma([y as u8])
    })
}

/// Pixels strictly brighter than `threshold` turn white, the rest black. With `preserve` set the
/// source colors are kept unchanged.
pub fn binarize(src: &DynamicImage, threshold: i32, preserve: bool) -> DynamicImage {
    if preserve {
        return DynamicImage::ImageRgba8(src.to_rgba8());
    }

    let threshold = u8::try_from(threshold).unwrap_or_else(|_| {
        log::warn!("Halftone threshold {threshold} out of range, using {FALLBACK_THRESHOLD}");
        FALLBACK_THRESHOLD
    });
    let gray = grayscale(src);
    let bw = map_colors(&gray, |Luma([v])| Luma([if v > threshold { 255 } else { 0 }]));
    DynamicImage::ImageLuma8(bw)
}

/// Resizes to exactly `w x h` with bilinear filtering.
pub fn scale(src: &DynamicImage, w: u32, h: u32) -> DynamicImage {
    src.resize_exact(w, h, FilterType::Triangle)
}

/// Shrinks the halftone source so every module maps onto one 3x3 block of black or white pixels.
pub fn prepare(src: &DynamicImage, cols: usize, rows: usize, threshold: i32) -> RgbaImage {
    let (w, h) = (cols as u32 * 3, rows as u32 * 3);
    log::debug!("Preparing {w}x{h} halftone with threshold {threshold}...");
    binarize(&scale(src, w, h), threshold, false).to_rgba8()
}
