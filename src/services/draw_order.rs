//! Draw order: group cells by color so each color is selected once.

use crate::models::ImageCell;

/// Stable sort by `(color, row, col)`.
///
/// Every color then forms one contiguous run, so the number of palette
/// reselections equals the number of distinct colors.
pub fn optimize(cells: &[ImageCell]) -> Vec<ImageCell> {
    let mut ordered = cells.to_vec();
    ordered.sort_by_key(|c| (c.color, c.row, c.col));
    ordered
}
