use image::GrayImage;

use super::filter::gaussian_blur;

/// Inverted adaptive threshold against a Gaussian-weighted local mean.
///
/// A pixel becomes foreground (255) when it is at least `c` darker than the
/// mean of its `block_size` neighbourhood, background (0) otherwise. The mean
/// is rounded to 8 bits and `c` is floored before the comparison.
pub fn adaptive_threshold_inv(gray: &GrayImage, block_size: u32, c: f64) -> GrayImage {
    let (w, h) = gray.dimensions();
    let src: Vec<f32> = gray.as_raw().iter().map(|&v| v as f32).collect();
    let mean = gaussian_blur(&src, w as usize, h as usize, block_size as usize);
    let delta = c.floor() as i32;

    let raw: Vec<u8> = gray
        .as_raw()
        .iter()
        .zip(&mean)
        .map(|(&v, &m)| {
            let m = m.round().clamp(0.0, 255.0) as i32;
            if v as i32 - m <= -delta {
                255
            } else {
                0
            }
        })
        .collect();
    GrayImage::from_raw(w, h, raw).unwrap_or_else(|| GrayImage::new(w, h))
}
