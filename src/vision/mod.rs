//! Image analysis primitives used by the canvas and palette detectors.
//!
//! All functions operate on `image` buffers and return new buffers; binary
//! images use 255 for foreground and 0 for background.

mod contour;
mod filter;
mod hough;
mod morphology;
mod threshold;

use image::{GrayImage, RgbImage};

pub use contour::{approx_polygon, arc_length, bounding_rect, external_contours, BoundingBox, Point};
pub use filter::blur_gray;
pub use hough::{hough_circles, Circle, HoughParams};
pub use morphology::open;
pub use threshold::adaptive_threshold_inv;

/// Luma conversion with the `image` crate's weights.
pub fn to_gray(img: &RgbImage) -> GrayImage {
    image::imageops::grayscale(img)
}

/// Mean color of the `(2 * half + 1)`-sided square centred on (cx, cy),
/// clipped to the image. `None` if the square misses the image entirely.
pub fn mean_color(img: &RgbImage, cx: i64, cy: i64, half: i64) -> Option<[u8; 3]> {
    let (w, h) = (img.width() as i64, img.height() as i64);
    let (x0, x1) = ((cx - half).max(0), (cx + half + 1).min(w));
    let (y0, y1) = ((cy - half).max(0), (cy + half + 1).min(h));
    if x0 >= x1 || y0 >= y1 {
        return None;
    }
    let mut sum = [0u64; 3];
    for y in y0..y1 {
        for x in x0..x1 {
            let p = img.get_pixel(x as u32, y as u32);
            for c in 0..3 {
                sum[c] += p[c] as u64;
            }
        }
    }
    let n = ((x1 - x0) * (y1 - y0)) as u64;
    Some([
        (sum[0] / n) as u8,
        (sum[1] / n) as u8,
        (sum[2] / n) as u8,
    ])
}
