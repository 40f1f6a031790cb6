//! Per-cell drawing records and palette swatches.

use swatch_match::Rgb;

use super::geometry::ScreenPoint;

/// One quantized pixel of the downsampled source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageCell {
    pub col: u32,
    pub row: u32,
    pub color: Rgb,
}

impl ImageCell {
    pub fn new(col: u32, row: u32, color: Rgb) -> Self {
        Self { col, row, color }
    }
}

/// A selectable palette color and where to click it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteSwatch {
    pub color: Rgb,
    pub center: ScreenPoint,
    pub radius: u32,
}

/// One (select color, click cell) action pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawOp {
    /// Screen point of the canvas cell
    pub target: ScreenPoint,
    /// Screen point of the swatch to select first
    pub swatch: ScreenPoint,
    pub color: Rgb,
}
