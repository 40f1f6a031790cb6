//! Debug snapshots written as PNG files when `--debug` is on.

use std::path::{Path, PathBuf};

use image::{GrayImage, Rgb as Pixel, RgbImage};

use crate::vision::Circle;

/// Sink for intermediate detection images. Disabled sinks do nothing.
#[derive(Debug, Clone, Default)]
pub struct DebugImages {
    dir: Option<PathBuf>,
}

impl DebugImages {
    pub fn disabled() -> Self {
        Self { dir: None }
    }

    pub fn enabled(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn save_gray(&self, name: &str, img: &GrayImage) {
        if let Some(path) = self.prepare(name) {
            if let Err(e) = img.save(&path) {
                tracing::warn!(%e, path = %path.display(), "Failed to write debug image");
            }
        }
    }

    pub fn save_rgb(&self, name: &str, img: &RgbImage) {
        if let Some(path) = self.prepare(name) {
            if let Err(e) = img.save(&path) {
                tracing::warn!(%e, path = %path.display(), "Failed to write debug image");
            }
        }
    }

    fn prepare(&self, name: &str) -> Option<PathBuf> {
        let dir = self.dir.as_ref()?;
        if let Err(e) = std::fs::create_dir_all(dir) {
            tracing::warn!(%e, dir = %dir.display(), "Cannot create debug directory");
            return None;
        }
        let path = dir.join(format!("{}.png", name));
        tracing::debug!(path = %path.display(), "Saving debug image");
        Some(path)
    }
}

pub const GREEN: Pixel<u8> = Pixel([0, 255, 0]);
pub const RED: Pixel<u8> = Pixel([255, 0, 0]);

/// Outline the box with corners (x0, y0) and (x1, y1), inclusive, clipped.
pub fn draw_rect(img: &mut RgbImage, x0: i32, y0: i32, x1: i32, y1: i32, color: Pixel<u8>) {
    for x in x0..=x1 {
        put(img, x, y0, color);
        put(img, x, y1, color);
    }
    for y in y0..=y1 {
        put(img, x0, y, color);
        put(img, x1, y, color);
    }
}

/// Outline a circle and mark its center.
pub fn draw_circle(img: &mut RgbImage, circle: &Circle, color: Pixel<u8>) {
    let (cx, cy, r) = (circle.x, circle.y, circle.radius);
    let steps = ((2.0 * std::f64::consts::PI * r).ceil() as usize).max(8);
    for i in 0..steps {
        let t = i as f64 / steps as f64 * 2.0 * std::f64::consts::PI;
        put(
            img,
            (cx + r * t.cos()).round() as i32,
            (cy + r * t.sin()).round() as i32,
            color,
        );
    }
    put(img, cx.round() as i32, cy.round() as i32, RED);
}

fn put(img: &mut RgbImage, x: i32, y: i32, color: Pixel<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}
