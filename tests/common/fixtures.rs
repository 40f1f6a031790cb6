//! Synthetic screens and input images.

use image::{Rgb as Pixel, RgbImage};

pub const BACKGROUND: Pixel<u8> = Pixel([230, 230, 230]);
pub const CELL: Pixel<u8> = Pixel([40, 40, 40]);

pub const RED_SWATCH: [u8; 3] = [200, 30, 30];
pub const BLUE_SWATCH: [u8; 3] = [30, 30, 200];
pub const ERASER_SWATCH: [u8; 3] = [90, 90, 90];

pub const SWATCH_RADIUS: i32 = 24;
/// Disc centers of the standard palette, left to right
pub const SWATCH_CENTERS: [(i32, i32); 3] = [(50, 40), (110, 40), (170, 40)];

pub const SCREEN_W: u32 = 640;
pub const SCREEN_H: u32 = 800;

/// Top-left of the standard canvas and its grid
pub const CANVAS_ORIGIN: (u32, u32) = (100, 400);
pub const CANVAS_COLS: u32 = 4;
pub const CANVAS_ROWS: u32 = 6;

pub fn blank_screen() -> RgbImage {
    RgbImage::from_pixel(SCREEN_W, SCREEN_H, BACKGROUND)
}

/// Dark 19px squares at a 20px pitch. Keep grids under 20 cells per side:
/// the bounding box then divides back to the same count.
pub fn draw_grid(img: &mut RgbImage, x0: u32, y0: u32, cols: u32, rows: u32) {
    for row in 0..rows {
        for col in 0..cols {
            for dy in 0..19 {
                for dx in 0..19 {
                    img.put_pixel(x0 + col * 20 + dx, y0 + row * 20 + dy, CELL);
                }
            }
        }
    }
}

pub fn draw_disc(img: &mut RgbImage, cx: i32, cy: i32, r: i32, color: [u8; 3]) {
    for y in (cy - r).max(0)..=(cy + r).min(img.height() as i32 - 1) {
        for x in (cx - r).max(0)..=(cx + r).min(img.width() as i32 - 1) {
            let (dx, dy) = (x - cx, y - cy);
            if dx * dx + dy * dy <= r * r {
                img.put_pixel(x as u32, y as u32, Pixel(color));
            }
        }
    }
}

pub fn draw_palette(img: &mut RgbImage) {
    let colors = [RED_SWATCH, BLUE_SWATCH, ERASER_SWATCH];
    for (&(x, y), color) in SWATCH_CENTERS.iter().zip(colors) {
        draw_disc(img, x, y, SWATCH_RADIUS, color);
    }
}

/// Palette in the top-left corner and a 4x6 canvas lower down.
pub fn standard_screen() -> RgbImage {
    let mut img = blank_screen();
    draw_palette(&mut img);
    draw_grid(&mut img, CANVAS_ORIGIN.0, CANVAS_ORIGIN.1, CANVAS_COLS, CANVAS_ROWS);
    img
}

/// Palette only; the canvas must be picked by hand.
pub fn palette_only_screen() -> RgbImage {
    let mut img = blank_screen();
    draw_palette(&mut img);
    img
}

/// Red top half, blue bottom half.
pub fn two_tone_image(w: u32, h: u32) -> RgbImage {
    RgbImage::from_fn(w, h, |_, y| {
        if y < h / 2 {
            Pixel([255, 0, 0])
        } else {
            Pixel([0, 0, 255])
        }
    })
}
