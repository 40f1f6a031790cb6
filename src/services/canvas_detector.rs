//! Canvas geometry detection.
//!
//! Grid cells show up as small near-square outlines after adaptive
//! thresholding. The canvas is the bounding box of every such candidate and
//! the grid size comes from the average candidate size, so a few missed or
//! spurious cells barely move the result.

use image::imageops::crop_imm;
use image::RgbImage;

use crate::models::{DrawConfig, GridSpec, Rect, ScreenPoint};
use crate::vision::{
    adaptive_threshold_inv, approx_polygon, arc_length, bounding_rect, external_contours, open,
    to_gray, BoundingBox,
};

use super::capture::Frame;
use super::debug_images::{draw_rect, DebugImages, GREEN};

/// Canvas placement and grid for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasLayout {
    pub rect: Rect,
    pub grid: GridSpec,
    /// Average candidate cell size; `None` when the fallback size was used
    pub cell_size: Option<(u32, u32)>,
    pub candidates: usize,
}

pub struct CanvasGeometryDetector {
    config: DrawConfig,
    debug: DebugImages,
}

impl CanvasGeometryDetector {
    pub fn new(config: &DrawConfig) -> Self {
        Self {
            config: config.clone(),
            debug: DebugImages::disabled(),
        }
    }

    pub fn with_debug(mut self, debug: DebugImages) -> Self {
        self.debug = debug;
        self
    }

    /// Find the canvas in a full-screen frame.
    ///
    /// Only the part of the screen below `search_offset_y_ratio` is searched.
    /// Returns `None` when no candidate cell survives the filters.
    pub fn detect(&self, screen: &Frame) -> Option<CanvasLayout> {
        let (w, h) = screen.image.dimensions();
        let offset = (h as f64 * self.config.search_offset_y_ratio) as u32;
        if offset >= h || w == 0 {
            tracing::warn!(width = w, height = h, "Screen too small for canvas search");
            return None;
        }
        let region = crop_imm(&screen.image, 0, offset, w, h - offset).to_image();
        let cells = self.candidate_cells(&region, "canvas");

        if cells.is_empty() {
            tracing::warn!("No canvas cells detected");
            return None;
        }

        let rects: Vec<Rect> = cells
            .iter()
            .filter_map(|b| {
                let tl = screen.to_screen(b.x, b.y + offset as i32);
                Rect::new(tl, tl.offset(b.width, b.height))
            })
            .collect();
        let rect = Rect::bounding(rects.iter().copied())?;
        let (cell_w, cell_h) = average_size(&cells);
        tracing::info!(cell_w, cell_h, candidates = cells.len(), "Average canvas cell size");

        let raw = GridSpec::from_cell_size(&rect, cell_w, cell_h);
        let grid = raw.oriented(self.config.assume_portrait);
        if grid != raw {
            tracing::info!(%raw, %grid, "Grid orientation corrected");
        }
        tracing::info!(%rect, %grid, "Canvas detected");

        Some(CanvasLayout {
            rect,
            grid,
            cell_size: Some((cell_w, cell_h)),
            candidates: cells.len(),
        })
    }

    /// Grid for a user-picked canvas rect.
    ///
    /// `region` is a capture of exactly `rect`; without it, or when it holds
    /// no candidate cells, the grid uses `fallback_cell_size`. No orientation
    /// correction is applied to a picked canvas.
    pub fn set_manual(&self, rect: Rect, region: Option<&Frame>) -> CanvasLayout {
        let cells = region
            .map(|frame| self.candidate_cells(&frame.image, "canvas_manual"))
            .unwrap_or_default();

        if cells.is_empty() {
            let size = self.config.fallback_cell_size;
            let grid = GridSpec::from_cell_size(&rect, size, size);
            tracing::warn!(%rect, %grid, size, "No cells in picked canvas, using fallback cell size");
            return CanvasLayout {
                rect,
                grid,
                cell_size: None,
                candidates: 0,
            };
        }

        let (cell_w, cell_h) = average_size(&cells);
        let grid = GridSpec::from_cell_size(&rect, cell_w, cell_h);
        tracing::info!(%rect, %grid, cell_w, cell_h, "Canvas set manually");
        CanvasLayout {
            rect,
            grid,
            cell_size: Some((cell_w, cell_h)),
            candidates: cells.len(),
        }
    }

    /// Bounding boxes, in `img` coordinates, of contours that look like cells.
    fn candidate_cells(&self, img: &RgbImage, tag: &str) -> Vec<BoundingBox> {
        let cfg = &self.config;
        let gray = to_gray(img);
        let bin = adaptive_threshold_inv(&gray, cfg.adaptive_thresh_block_size, cfg.adaptive_thresh_c);
        let bin = open(&bin, cfg.morph_kernel_size, cfg.morph_iterations);
        self.debug.save_gray(&format!("{}_threshold", tag), &bin);

        let contours = external_contours(&bin);
        let cells: Vec<BoundingBox> = contours
            .iter()
            .filter_map(|contour| {
                let peri = arc_length(contour, true);
                let poly = approx_polygon(contour, 0.02 * peri);
                if poly.len() != 4 {
                    return None;
                }
                bounding_rect(&poly).filter(|b| self.is_cell(b))
            })
            .collect();
        tracing::debug!(contours = contours.len(), cells = cells.len(), "Cell candidates");

        if self.debug.is_enabled() {
            let mut overlay = img.clone();
            for b in &cells {
                draw_rect(&mut overlay, b.x, b.y, b.x + b.width - 1, b.y + b.height - 1, GREEN);
            }
            self.debug.save_rgb(&format!("{}_cells", tag), &overlay);
        }
        cells
    }

    fn is_cell(&self, b: &BoundingBox) -> bool {
        let cfg = &self.config;
        if b.height <= 0 {
            return false;
        }
        let aspect = b.width as f64 / b.height as f64;
        aspect > cfg.cell_min_aspect_ratio
            && aspect < cfg.cell_max_aspect_ratio
            && b.width > cfg.cell_min_width as i32
            && b.width < cfg.cell_max_width as i32
            && b.height > cfg.cell_min_height as i32
            && b.height < cfg.cell_max_height as i32
    }
}

/// Truncated mean width and height.
fn average_size(cells: &[BoundingBox]) -> (u32, u32) {
    let n = cells.len().max(1) as i64;
    let w: i64 = cells.iter().map(|b| b.width as i64).sum();
    let h: i64 = cells.iter().map(|b| b.height as i64).sum();
    (((w / n).max(1)) as u32, ((h / n).max(1)) as u32)
}

impl CanvasLayout {
    /// Screen-space center of each cell, row-major.
    pub fn cell_centers(&self) -> impl Iterator<Item = ScreenPoint> + '_ {
        self.grid
            .cells_row_major()
            .map(move |(col, row)| self.grid.cell_center(&self.rect, col, row))
    }
}
