//! Turns the source image into one quantized color per canvas cell.

use std::collections::HashSet;
use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage};
use swatch_match::{ColorQuantizer, Rgb};

use crate::error::ImageError;
use crate::models::{DrawConfig, GridSpec, ImageCell};

/// Downsampled, quantized source image. Cells are row-major and never
/// change after planning.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePlan {
    pub width: u32,
    pub height: u32,
    pub cells: Vec<ImageCell>,
}

impl ImagePlan {
    /// Distinct colors, sorted.
    pub fn colors(&self) -> Vec<Rgb> {
        let mut colors: Vec<Rgb> = self
            .cells
            .iter()
            .map(|c| c.color)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        colors.sort();
        colors
    }
}

pub struct ImagePlanner {
    num_colors: usize,
    assume_portrait: bool,
    seed: u64,
}

impl ImagePlanner {
    pub fn new(config: &DrawConfig, seed: u64) -> Self {
        Self {
            num_colors: config.num_colors,
            assume_portrait: config.assume_portrait,
            seed,
        }
    }

    pub fn plan_file(&self, path: &Path, grid: GridSpec) -> Result<ImagePlan, ImageError> {
        tracing::info!(path = %path.display(), %grid, "Planning image");
        let img = image::open(path)?;
        self.plan(&img, grid)
    }

    /// Fit the image into `grid` and quantize it to at most `num_colors`.
    pub fn plan(&self, img: &DynamicImage, grid: GridSpec) -> Result<ImagePlan, ImageError> {
        let mut rgb = img.to_rgb8();
        if rgb.width() == 0 || rgb.height() == 0 {
            return Err(ImageError::Empty);
        }
        if self.assume_portrait && rgb.width() > rgb.height() {
            rgb = imageops::rotate270(&rgb);
            tracing::info!("Image rotated 90 degrees to match the canvas");
        }
        let small = thumbnail(&rgb, grid.cols(), grid.rows());
        let (width, height) = small.dimensions();

        let pixels: Vec<Rgb> = small.pixels().map(|p| Rgb::from(p.0)).collect();
        let distinct = pixels.iter().collect::<HashSet<_>>().len();
        let k = self.num_colors.min(distinct);
        tracing::info!(width, height, distinct, clusters = k, "Image downsampled");

        let clustering = ColorQuantizer::new(self.seed).cluster(&pixels, k)?;
        let cells = clustering
            .quantized()
            .enumerate()
            .map(|(i, color)| ImageCell::new(i as u32 % width, i as u32 / width, color))
            .collect();

        Ok(ImagePlan {
            width,
            height,
            cells,
        })
    }
}

/// Shrink to fit within `max_w` x `max_h`, keeping the aspect ratio.
/// Images that already fit are returned as is.
fn thumbnail(img: &RgbImage, max_w: u32, max_h: u32) -> RgbImage {
    let (w, h) = img.dimensions();
    if w <= max_w && h <= max_h {
        return img.clone();
    }
    let scale = (max_w as f64 / w as f64).min(max_h as f64 / h as f64);
    let nw = ((w as f64 * scale).round() as u32).clamp(1, max_w);
    let nh = ((h as f64 * scale).round() as u32).clamp(1, max_h);
    imageops::resize(img, nw, nh, FilterType::Lanczos3)
}
