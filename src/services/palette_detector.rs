//! Palette geometry detection and swatch color extraction.

use std::collections::HashSet;

use image::imageops::crop_imm;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use swatch_match::{ColorQuantizer, Rgb};

use crate::error::CaptureError;
use crate::models::{DrawConfig, PaletteSwatch, Rect, ScreenPoint};
use crate::vision::{blur_gray, hough_circles, mean_color, to_gray, HoughParams};

use super::capture::{Frame, ScreenCapture};
use super::debug_images::{draw_circle, draw_rect, DebugImages, GREEN};

/// Chooses the eraser among the detected swatches.
pub type EraserStrategy = Box<dyn Fn(&[PaletteSwatch]) -> Option<PaletteSwatch> + Send + Sync>;

/// The rightmost swatch; the last one on ties.
pub fn rightmost_swatch(swatches: &[PaletteSwatch]) -> Option<PaletteSwatch> {
    swatches.iter().max_by_key(|s| s.center.x).copied()
}

/// Palette placement for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteLayout {
    pub rect: Rect,
    /// Ascending by x
    pub swatches: Vec<PaletteSwatch>,
    pub eraser: Option<ScreenPoint>,
}

impl PaletteLayout {
    pub fn with_eraser(mut self, eraser: Option<ScreenPoint>) -> Self {
        self.eraser = eraser;
        self
    }
}

pub struct PaletteGeometryDetector {
    config: DrawConfig,
    eraser: EraserStrategy,
    debug: DebugImages,
}

impl PaletteGeometryDetector {
    pub fn new(config: &DrawConfig) -> Self {
        Self {
            config: config.clone(),
            eraser: Box::new(rightmost_swatch),
            debug: DebugImages::disabled(),
        }
    }

    pub fn with_eraser_strategy(mut self, strategy: EraserStrategy) -> Self {
        self.eraser = strategy;
        self
    }

    pub fn with_debug(mut self, debug: DebugImages) -> Self {
        self.debug = debug;
        self
    }

    fn hough_params(&self) -> HoughParams {
        let cfg = &self.config;
        HoughParams {
            dp: cfg.hough_dp,
            min_dist: cfg.hough_min_dist,
            param1: cfg.hough_param1,
            param2: cfg.hough_param2,
            min_radius: cfg.swatch_min_radius,
            max_radius: cfg.swatch_max_radius,
        }
    }

    /// Find circular swatches in the top-left corner of a full-screen frame.
    pub fn detect(&self, screen: &Frame) -> Option<PaletteLayout> {
        let (w, h) = screen.image.dimensions();
        let sw = (w as f64 * self.config.palette_search_width_ratio) as u32;
        let sh = (h as f64 * self.config.palette_search_height_ratio) as u32;
        if sw == 0 || sh == 0 {
            tracing::warn!(width = w, height = h, "Screen too small for palette search");
            return None;
        }

        let region = crop_imm(&screen.image, 0, 0, sw, sh).to_image();
        let gray = blur_gray(&to_gray(&region), 3);
        self.debug.save_gray("palette_gray", &gray);

        let mut circles = hough_circles(&gray, &self.hough_params());
        tracing::debug!(found = circles.len(), "Palette circles before filtering");
        if circles.is_empty() {
            tracing::warn!("No palette swatches detected");
            return None;
        }
        for c in circles.iter_mut() {
            c.x = c.x.round();
            c.y = c.y.round();
            c.radius = c.radius.round();
        }
        circles.sort_by(|a, b| a.x.total_cmp(&b.x));
        circles.truncate(self.config.max_swatches);

        let swatches: Vec<PaletteSwatch> = circles
            .iter()
            .filter_map(|c| {
                let (x, y, r) = (c.x as i32, c.y as i32, c.radius as u32);
                let half = (r / 4).max(1) as i64;
                let color = mean_color(&screen.image, x as i64, y as i64, half)?;
                Some(PaletteSwatch {
                    color: Rgb::from(color),
                    center: screen.to_screen(x, y),
                    radius: r,
                })
            })
            .collect();

        let rect = swatch_bounds(&swatches).and_then(|r| clip(r, screen.bounds()?))?;
        let eraser = (self.eraser)(&swatches).map(|s| s.center);

        if self.debug.is_enabled() {
            let mut overlay = screen.image.clone();
            let (tl, br) = (screen.to_local(rect.top_left()), screen.to_local(rect.bottom_right()));
            draw_rect(&mut overlay, tl.0, tl.1, br.0 - 1, br.1 - 1, GREEN);
            for c in &circles {
                draw_circle(&mut overlay, c, GREEN);
            }
            self.debug.save_rgb("palette_circles", &overlay);
        }

        tracing::info!(%rect, swatches = swatches.len(), "Palette detected");
        match eraser {
            Some(p) => tracing::info!(x = p.x, y = p.y, "Eraser candidate"),
            None => tracing::info!("No eraser candidate"),
        }
        Some(PaletteLayout {
            rect,
            swatches,
            eraser,
        })
    }

    /// Palette from a user-picked rect and an optional swatch list.
    pub fn set_manual(&self, rect: Rect, swatches: Vec<PaletteSwatch>) -> PaletteLayout {
        let mut swatches = swatches;
        swatches.sort_by_key(|s| s.center.x);
        swatches.truncate(self.config.max_swatches);
        let eraser = (self.eraser)(&swatches).map(|s| s.center);
        tracing::info!(%rect, swatches = swatches.len(), "Palette set manually");
        PaletteLayout {
            rect,
            swatches,
            eraser,
        }
    }

    /// Capture the stored palette rect.
    pub fn capture(&self, capture: &dyn ScreenCapture, layout: &PaletteLayout) -> Result<Frame, CaptureError> {
        capture.capture(Some(layout.rect))
    }

    /// Live `(color, click point)` pairs for the palette.
    ///
    /// Known swatches are sampled on a `radius / 4` square around their
    /// center. Without swatches, the palette image is clustered into
    /// `expected` colors and each centroid is paired with the mean position
    /// of its pixels.
    pub fn extract_colors(
        &self,
        layout: &PaletteLayout,
        palette: &Frame,
        expected: usize,
        seed: u64,
    ) -> Vec<(Rgb, ScreenPoint)> {
        if layout.swatches.is_empty() {
            return self.extract_by_clustering(palette, expected, seed);
        }

        let colors: Vec<(Rgb, ScreenPoint)> = layout
            .swatches
            .iter()
            .filter_map(|s| {
                let (x, y) = palette.to_local(s.center);
                let half = (s.radius / 4).max(1) as i64;
                let color = mean_color(&palette.image, x as i64, y as i64, half);
                if color.is_none() {
                    tracing::warn!(x = s.center.x, y = s.center.y, "Swatch outside palette capture");
                }
                color.map(|c| (Rgb::from(c), s.center))
            })
            .collect();
        if colors.len() != expected {
            tracing::warn!(found = colors.len(), expected, "Palette color count mismatch");
        }
        for (color, point) in &colors {
            tracing::debug!(%color, x = point.x, y = point.y, "Palette color");
        }
        colors
    }

    fn extract_by_clustering(&self, palette: &Frame, expected: usize, seed: u64) -> Vec<(Rgb, ScreenPoint)> {
        let img = &palette.image;
        let width = img.width() as usize;
        let pixels: Vec<Rgb> = img.pixels().map(|p| Rgb::from(p.0)).collect();
        if pixels.is_empty() || expected == 0 {
            tracing::warn!("Palette capture is empty, no colors extracted");
            return Vec::new();
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let amount = self.config.palette_sample_points.min(pixels.len());
        let sample: Vec<Rgb> = index::sample(&mut rng, pixels.len(), amount)
            .into_iter()
            .map(|i| pixels[i])
            .collect();
        let distinct = sample.iter().collect::<HashSet<_>>().len();
        let k = expected.min(distinct);

        let mut quantizer = ColorQuantizer::new(seed);
        let clustered = quantizer
            .cluster(&sample, k)
            .and_then(|clustering| Ok((clustering.centroids, quantizer.predict(&pixels)?)));
        let (centroids, labels) = match clustered {
            Ok(fit) => fit,
            Err(e) => {
                tracing::warn!(%e, "Palette clustering failed");
                return Vec::new();
            }
        };

        let mut sums = vec![(0u64, 0u64, 0u64); centroids.len()];
        for (i, &label) in labels.iter().enumerate() {
            let entry = &mut sums[label];
            entry.0 += (i % width) as u64;
            entry.1 += (i / width) as u64;
            entry.2 += 1;
        }

        let mut seen = HashSet::new();
        let mut colors = Vec::new();
        for (centroid, (sx, sy, n)) in centroids.iter().zip(sums) {
            if n == 0 || !seen.insert(*centroid) {
                continue;
            }
            let point = palette.to_screen((sx / n) as i32, (sy / n) as i32);
            tracing::debug!(color = %centroid, x = point.x, y = point.y, "Clustered palette color");
            colors.push((*centroid, point));
        }
        tracing::info!(colors = colors.len(), k, "Palette colors extracted by clustering");
        colors
    }
}

/// Bounding box of the swatch circles.
fn swatch_bounds(swatches: &[PaletteSwatch]) -> Option<Rect> {
    Rect::bounding(swatches.iter().filter_map(|s| {
        let r = s.radius as i32;
        Rect::from_coords(s.center.x - r, s.center.y - r, s.center.x + r, s.center.y + r)
    }))
}

fn clip(rect: Rect, bounds: Rect) -> Option<Rect> {
    let (tl, br) = (rect.top_left(), rect.bottom_right());
    let (btl, bbr) = (bounds.top_left(), bounds.bottom_right());
    Rect::from_coords(
        tl.x.max(btl.x),
        tl.y.max(btl.y),
        br.x.min(bbr.x),
        br.y.min(bbr.y),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb as Pixel, RgbImage};
    use pretty_assertions::assert_eq;

    const LIGHT: Pixel<u8> = Pixel([230, 230, 230]);

    fn swatch(color: [u8; 3], x: i32, y: i32) -> PaletteSwatch {
        PaletteSwatch {
            color: Rgb::from(color),
            center: ScreenPoint::new(x, y),
            radius: 24,
        }
    }

    /// Full screen with two discs of radius 24 in the palette corner.
    fn palette_screen() -> RgbImage {
        let discs = [((50, 40), [200, 30, 30]), ((130, 40), [30, 30, 200])];
        RgbImage::from_fn(640, 800, |x, y| {
            for ((cx, cy), color) in discs {
                let (dx, dy) = (x as i32 - cx, y as i32 - cy);
                if dx * dx + dy * dy <= 24 * 24 {
                    return Pixel(color);
                }
            }
            LIGHT
        })
    }

    #[test]
    fn test_rightmost_swatch() {
        let swatches = [swatch([0, 0, 0], 10, 0), swatch([1, 1, 1], 90, 0), swatch([2, 2, 2], 40, 0)];
        assert_eq!(rightmost_swatch(&swatches).unwrap().center, ScreenPoint::new(90, 0));
        assert_eq!(rightmost_swatch(&[]), None);
    }

    #[test]
    fn test_detect_two_swatches() {
        let frame = Frame::new(palette_screen(), ScreenPoint::new(0, 0));
        let layout = PaletteGeometryDetector::new(&DrawConfig::default())
            .detect(&frame)
            .unwrap();

        assert_eq!(layout.swatches.len(), 2);
        let (a, b) = (&layout.swatches[0], &layout.swatches[1]);
        assert!((a.center.x - 50).abs() <= 2 && (a.center.y - 40).abs() <= 2);
        assert!((b.center.x - 130).abs() <= 2 && (b.center.y - 40).abs() <= 2);
        assert_eq!(a.color, Rgb::new(200, 30, 30));
        assert_eq!(b.color, Rgb::new(30, 30, 200));
        assert_eq!(layout.eraser, Some(b.center));
        assert!(layout.rect.contains(a.center) && layout.rect.contains(b.center));
    }

    #[test]
    fn test_detect_empty_corner() {
        let frame = Frame::new(RgbImage::from_pixel(640, 800, LIGHT), ScreenPoint::new(0, 0));
        assert!(PaletteGeometryDetector::new(&DrawConfig::default())
            .detect(&frame)
            .is_none());
    }

    #[test]
    fn test_custom_eraser_strategy() {
        let detector = PaletteGeometryDetector::new(&DrawConfig::default())
            .with_eraser_strategy(Box::new(|s: &[PaletteSwatch]| s.first().copied()));
        let rect = Rect::from_coords(0, 0, 100, 50).unwrap();
        let layout = detector.set_manual(rect, vec![swatch([9, 9, 9], 70, 20), swatch([1, 1, 1], 20, 20)]);
        assert_eq!(layout.swatches[0].center.x, 20);
        assert_eq!(layout.eraser, Some(ScreenPoint::new(20, 20)));
    }

    #[test]
    fn test_manual_palette_without_swatches() {
        let rect = Rect::from_coords(0, 0, 100, 50).unwrap();
        let layout = PaletteGeometryDetector::new(&DrawConfig::default()).set_manual(rect, Vec::new());
        assert!(layout.swatches.is_empty());
        assert_eq!(layout.eraser, None);
    }

    #[test]
    fn test_extract_colors_samples_swatches() {
        let origin = ScreenPoint::new(100, 10);
        let img = RgbImage::from_fn(100, 50, |x, _| {
            if x < 50 {
                Pixel([250, 10, 10])
            } else {
                Pixel([10, 250, 10])
            }
        });
        let palette = Frame::new(img, origin);
        let layout = PaletteLayout {
            rect: palette.bounds().unwrap(),
            swatches: vec![swatch([0, 0, 0], 125, 35), swatch([0, 0, 0], 175, 35)],
            eraser: None,
        };
        let colors = PaletteGeometryDetector::new(&DrawConfig::default()).extract_colors(&layout, &palette, 2, 0);
        assert_eq!(
            colors,
            vec![
                (Rgb::new(250, 10, 10), ScreenPoint::new(125, 35)),
                (Rgb::new(10, 250, 10), ScreenPoint::new(175, 35)),
            ]
        );
    }

    #[test]
    fn test_extract_colors_by_clustering() {
        let img = RgbImage::from_fn(40, 20, |x, _| {
            if x < 20 {
                Pixel([250, 10, 10])
            } else {
                Pixel([10, 10, 250])
            }
        });
        let palette = Frame::new(img, ScreenPoint::new(300, 5));
        let layout = PaletteLayout {
            rect: palette.bounds().unwrap(),
            swatches: Vec::new(),
            eraser: None,
        };
        let detector = PaletteGeometryDetector::new(&DrawConfig::default());
        let mut colors = detector.extract_colors(&layout, &palette, 5, 42);
        colors.sort();

        assert_eq!(
            colors,
            vec![
                (Rgb::new(10, 10, 250), ScreenPoint::new(329, 14)),
                (Rgb::new(250, 10, 10), ScreenPoint::new(309, 14)),
            ]
        );
        assert_eq!(detector.extract_colors(&layout, &palette, 5, 42).len(), 2);
    }
}
