//! Preview rendering and confirmation.
//!
//! The planned cells are written as an indexed PNG, one `scale` x `scale`
//! block per cell, and the run waits for Enter (confirm) or Backspace
//! (reject) from the control listener.

use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::Duration;

use crate::error::PreviewError;

use super::image_planner::ImagePlan;
use super::input_listener::PreviewDecision;

/// Source of the user's answer to the preview.
pub trait PreviewConfirmation: Send {
    /// Drop answers given before the preview was shown.
    fn discard_pending(&mut self) {}

    /// Wait up to `timeout` for an answer.
    fn poll_decision(&mut self, timeout: Duration) -> Option<PreviewDecision>;
}

/// Answers delivered by the control listener's Enter/Backspace keys.
pub struct KeyConfirmation {
    decisions: Receiver<PreviewDecision>,
}

impl KeyConfirmation {
    pub fn new(decisions: Receiver<PreviewDecision>) -> Self {
        Self { decisions }
    }
}

impl PreviewConfirmation for KeyConfirmation {
    fn discard_pending(&mut self) {
        let mut dropped = 0usize;
        loop {
            match self.decisions.try_recv() {
                Ok(_) => dropped += 1,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        if dropped > 0 {
            tracing::debug!(dropped, "Ignoring keys pressed before the preview");
        }
    }

    fn poll_decision(&mut self, timeout: Duration) -> Option<PreviewDecision> {
        match self.decisions.recv_timeout(timeout) {
            Ok(decision) => Some(decision),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

/// Encode the plan as a PNG with each cell scaled to a `scale`-pixel block.
pub fn render_preview(plan: &ImagePlan, scale: u32) -> Result<Vec<u8>, PreviewError> {
    let scale = scale.max(1);
    let width = plan.width * scale;
    let height = plan.height * scale;
    if width == 0 || height == 0 {
        return Err(PreviewError::Encode("empty preview".to_string()));
    }

    let colors = plan.colors();
    let mut grid = vec![0usize; (plan.width * plan.height) as usize];
    for cell in &plan.cells {
        if let Ok(i) = colors.binary_search(&cell.color) {
            grid[(cell.row * plan.width + cell.col) as usize] = i;
        }
    }

    // Indexed output needs at most 256 entries; otherwise fall back to RGB.
    let (color_type, bit_depth, plte, data) = if colors.len() <= 256 {
        let (depth, bits) = match colors.len() {
            0..=2 => (png::BitDepth::One, 1),
            3..=4 => (png::BitDepth::Two, 2),
            5..=16 => (png::BitDepth::Four, 4),
            _ => (png::BitDepth::Eight, 8),
        };
        let indices: Vec<u8> = scaled(plan, &grid, scale).map(|i| i as u8).collect();
        let plte: Vec<u8> = colors.iter().flat_map(|c| c.to_bytes()).collect();
        let packed = if bits == 8 {
            indices
        } else {
            pack_nbits(&indices, width, bits)
        };
        (png::ColorType::Indexed, depth, Some(plte), packed)
    } else {
        let rgb: Vec<u8> = scaled(plan, &grid, scale)
            .flat_map(|i| colors.get(i).copied().unwrap_or_default().to_bytes())
            .collect();
        (png::ColorType::Rgb, png::BitDepth::Eight, None, rgb)
    };

    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(color_type);
        encoder.set_depth(bit_depth);
        encoder.set_compression(png::Compression::Fast);
        if let Some(plte) = plte {
            encoder.set_palette(plte);
        }
        let mut writer = encoder
            .write_header()
            .map_err(|e| PreviewError::Encode(e.to_string()))?;
        writer
            .write_image_data(&data)
            .map_err(|e| PreviewError::Encode(e.to_string()))?;
    }
    Ok(buf.into_inner())
}

/// Render and write the preview file.
pub fn write_preview(plan: &ImagePlan, scale: u32, path: &Path) -> Result<(), PreviewError> {
    let bytes = render_preview(plan, scale)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    tracing::info!(path = %path.display(), width = plan.width, height = plan.height, "Preview written");
    Ok(())
}

/// Palette indices of the upscaled image, row by row.
fn scaled<'a>(plan: &'a ImagePlan, grid: &'a [usize], scale: u32) -> impl Iterator<Item = usize> + 'a {
    let (w, h) = (plan.width, plan.height);
    (0..h * scale).flat_map(move |y| (0..w * scale).map(move |x| grid[((y / scale) * w + x / scale) as usize]))
}

/// Pack pixel values into N-bit PNG row data (1, 2, or 4 bits per pixel).
fn pack_nbits(indices: &[u8], width: u32, bits: u8) -> Vec<u8> {
    let pixels_per_byte = 8 / bits as usize;
    let bytes_per_row = (width as usize).div_ceil(pixels_per_byte);
    let height = indices.len() / width as usize;
    let mask = (1u8 << bits) - 1;
    let mut packed = Vec::with_capacity(bytes_per_row * height);

    for row in indices.chunks(width as usize) {
        let mut byte = 0u8;
        for (i, &idx) in row.iter().enumerate() {
            let shift = (8 - bits) - (i % pixels_per_byte) as u8 * bits;
            byte |= (idx & mask) << shift;

            if (i % pixels_per_byte) == pixels_per_byte - 1 || i == row.len() - 1 {
                packed.push(byte);
                byte = 0;
            }
        }
    }
    packed
}
