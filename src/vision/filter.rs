//! Linear filters: Gaussian smoothing and Sobel gradients.
//!
//! Borders replicate the edge pixel.

use image::GrayImage;

/// 1-D Gaussian kernel of odd length `ksize`, normalized to sum 1.
///
/// Sizes 3 and 5 use the binomial taps; larger sizes derive sigma from the
/// size as `0.3 * ((ksize - 1) * 0.5 - 1) + 0.8`.
pub(crate) fn gaussian_kernel(ksize: usize) -> Vec<f32> {
    match ksize {
        0 | 1 => vec![1.0],
        3 => vec![0.25, 0.5, 0.25],
        5 => vec![0.0625, 0.25, 0.375, 0.25, 0.0625],
        _ => {
            let sigma = 0.3 * ((ksize as f64 - 1.0) * 0.5 - 1.0) + 0.8;
            let half = (ksize / 2) as f64;
            let taps: Vec<f64> = (0..ksize)
                .map(|i| {
                    let x = i as f64 - half;
                    (-(x * x) / (2.0 * sigma * sigma)).exp()
                })
                .collect();
            let sum: f64 = taps.iter().sum();
            taps.iter().map(|t| (t / sum) as f32).collect()
        }
    }
}

#[inline]
fn clamp_index(i: isize, len: usize) -> usize {
    i.clamp(0, len as isize - 1) as usize
}

/// Separable Gaussian blur over a row-major `width * height` buffer.
pub(crate) fn gaussian_blur(src: &[f32], width: usize, height: usize, ksize: usize) -> Vec<f32> {
    if width == 0 || height == 0 {
        return Vec::new();
    }
    let kernel = gaussian_kernel(ksize);
    let half = (kernel.len() / 2) as isize;

    let mut tmp = vec![0.0f32; src.len()];
    for y in 0..height {
        let row = &src[y * width..(y + 1) * width];
        for x in 0..width {
            let mut acc = 0.0;
            for (k, &w) in kernel.iter().enumerate() {
                acc += w * row[clamp_index(x as isize + k as isize - half, width)];
            }
            tmp[y * width + x] = acc;
        }
    }

    let mut out = vec![0.0f32; src.len()];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0;
            for (k, &w) in kernel.iter().enumerate() {
                let sy = clamp_index(y as isize + k as isize - half, height);
                acc += w * tmp[sy * width + x];
            }
            out[y * width + x] = acc;
        }
    }
    out
}

/// Gaussian blur of an 8-bit image, rounding back to 8 bits.
pub fn blur_gray(img: &GrayImage, ksize: usize) -> GrayImage {
    let (w, h) = img.dimensions();
    let src: Vec<f32> = img.as_raw().iter().map(|&v| v as f32).collect();
    let out = gaussian_blur(&src, w as usize, h as usize, ksize);
    let raw: Vec<u8> = out
        .iter()
        .map(|v| v.round().clamp(0.0, 255.0) as u8)
        .collect();
    GrayImage::from_raw(w, h, raw).unwrap_or_else(|| GrayImage::new(w, h))
}

/// Horizontal and vertical 3x3 Sobel responses.
#[derive(Debug, Clone)]
pub(crate) struct Gradients {
    pub width: usize,
    pub height: usize,
    pub dx: Vec<i32>,
    pub dy: Vec<i32>,
}

impl Gradients {
    #[inline]
    pub fn at(&self, x: usize, y: usize) -> (i32, i32) {
        let i = y * self.width + x;
        (self.dx[i], self.dy[i])
    }
}

pub(crate) fn sobel(img: &GrayImage) -> Gradients {
    let (w, h) = img.dimensions();
    let (w, h) = (w as usize, h as usize);
    let raw = img.as_raw();
    let px = |x: isize, y: isize| -> i32 {
        raw[clamp_index(y, h) * w + clamp_index(x, w)] as i32
    };

    let mut dx = vec![0i32; w * h];
    let mut dy = vec![0i32; w * h];
    for y in 0..h as isize {
        for x in 0..w as isize {
            let i = y as usize * w + x as usize;
            dx[i] = (px(x + 1, y - 1) + 2 * px(x + 1, y) + px(x + 1, y + 1))
                - (px(x - 1, y - 1) + 2 * px(x - 1, y) + px(x - 1, y + 1));
            dy[i] = (px(x - 1, y + 1) + 2 * px(x, y + 1) + px(x + 1, y + 1))
                - (px(x - 1, y - 1) + 2 * px(x, y - 1) + px(x + 1, y - 1));
        }
    }
    Gradients {
        width: w,
        height: h,
        dx,
        dy,
    }
}
