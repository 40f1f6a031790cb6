//! Binary morphology with a square structuring element.
//!
//! Pixels outside the image never shrink an erosion nor grow a dilation.

use image::GrayImage;

fn sweep(img: &GrayImage, ksize: u32, pick: fn(u8, u8) -> u8, identity: u8) -> GrayImage {
    let (w, h) = img.dimensions();
    let (w, h) = (w as usize, h as usize);
    let k = ksize.max(1) as isize;
    let lo = -(k / 2);
    let hi = k - 1 - k / 2;
    let src = img.as_raw();

    let mut tmp = vec![identity; w * h];
    for y in 0..h {
        for x in 0..w {
            let mut acc = identity;
            for dx in lo..=hi {
                let sx = x as isize + dx;
                if sx >= 0 && (sx as usize) < w {
                    acc = pick(acc, src[y * w + sx as usize]);
                }
            }
            tmp[y * w + x] = acc;
        }
    }

    let mut out = vec![identity; w * h];
    for y in 0..h {
        for x in 0..w {
            let mut acc = identity;
            for dy in lo..=hi {
                let sy = y as isize + dy;
                if sy >= 0 && (sy as usize) < h {
                    acc = pick(acc, tmp[sy as usize * w + x]);
                }
            }
            out[y * w + x] = acc;
        }
    }
    GrayImage::from_raw(w as u32, h as u32, out).unwrap_or_else(|| GrayImage::new(w as u32, h as u32))
}

pub(crate) fn erode(img: &GrayImage, ksize: u32) -> GrayImage {
    sweep(img, ksize, u8::min, u8::MAX)
}

pub(crate) fn dilate(img: &GrayImage, ksize: u32) -> GrayImage {
    sweep(img, ksize, u8::max, u8::MIN)
}

/// Morphological opening: `iterations` erosions followed by as many dilations.
pub fn open(img: &GrayImage, ksize: u32, iterations: u32) -> GrayImage {
    let mut out = img.clone();
    for _ in 0..iterations {
        out = erode(&out, ksize);
    }
    for _ in 0..iterations {
        out = dilate(&out, ksize);
    }
    out
}
