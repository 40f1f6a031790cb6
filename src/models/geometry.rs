//! Screen-space geometry: points, rectangles and grid specifications.

use std::fmt;

/// Integer point in global screen pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Shift by a (dx, dy) offset.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl From<(i32, i32)> for ScreenPoint {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for ScreenPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Axis-aligned screen box with `top_left` strictly above and left of
/// `bottom_right`. The bottom-right corner is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    top_left: ScreenPoint,
    bottom_right: ScreenPoint,
}

impl Rect {
    /// Build a rect, or `None` unless `top_left < bottom_right` on both axes.
    pub fn new(top_left: ScreenPoint, bottom_right: ScreenPoint) -> Option<Self> {
        if top_left.x < bottom_right.x && top_left.y < bottom_right.y {
            Some(Self {
                top_left,
                bottom_right,
            })
        } else {
            None
        }
    }

    /// Build a rect from `(x1, y1)`-`(x2, y2)` corners.
    pub fn from_coords(x1: i32, y1: i32, x2: i32, y2: i32) -> Option<Self> {
        Self::new(ScreenPoint::new(x1, y1), ScreenPoint::new(x2, y2))
    }

    /// Smallest rect enclosing all of `rects`; `None` for an empty input.
    pub fn bounding<I: IntoIterator<Item = Rect>>(rects: I) -> Option<Self> {
        let mut iter = rects.into_iter();
        let first = iter.next()?;
        let (mut x1, mut y1, mut x2, mut y2) = (
            first.top_left.x,
            first.top_left.y,
            first.bottom_right.x,
            first.bottom_right.y,
        );
        for r in iter {
            x1 = x1.min(r.top_left.x);
            y1 = y1.min(r.top_left.y);
            x2 = x2.max(r.bottom_right.x);
            y2 = y2.max(r.bottom_right.y);
        }
        Self::from_coords(x1, y1, x2, y2)
    }

    pub fn top_left(&self) -> ScreenPoint {
        self.top_left
    }

    pub fn bottom_right(&self) -> ScreenPoint {
        self.bottom_right
    }

    pub fn width(&self) -> u32 {
        (self.bottom_right.x - self.top_left.x) as u32
    }

    pub fn height(&self) -> u32 {
        (self.bottom_right.y - self.top_left.y) as u32
    }

    pub fn contains(&self, p: ScreenPoint) -> bool {
        p.x >= self.top_left.x
            && p.x < self.bottom_right.x
            && p.y >= self.top_left.y
            && p.y < self.bottom_right.y
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.top_left, self.bottom_right)
    }
}

/// Column/row count of the canvas grid. Both are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridSpec {
    cols: u32,
    rows: u32,
}

impl GridSpec {
    /// Build a grid, raising zero dimensions to 1.
    pub fn new(cols: u32, rows: u32) -> Self {
        Self {
            cols: cols.max(1),
            rows: rows.max(1),
        }
    }

    /// Derive the grid from a canvas rect and an average cell size:
    /// `cols = max(1, width / cell_w)`, `rows = max(1, height / cell_h)`.
    pub fn from_cell_size(rect: &Rect, cell_w: u32, cell_h: u32) -> Self {
        Self::new(rect.width() / cell_w.max(1), rect.height() / cell_h.max(1))
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cell_count(&self) -> usize {
        self.cols as usize * self.rows as usize
    }

    /// Orientation correction: with `assume_portrait`, a grid wider than tall
    /// has its dimensions swapped. Applying it twice equals applying it once.
    pub fn oriented(self, assume_portrait: bool) -> Self {
        if assume_portrait && self.cols > self.rows {
            Self {
                cols: self.rows,
                rows: self.cols,
            }
        } else {
            self
        }
    }

    /// Screen-space center of cell (col, row) inside `rect`.
    ///
    /// The step is fractional (`width / cols`); the center is truncated to
    /// integer pixels and clamped into the rect.
    pub fn cell_center(&self, rect: &Rect, col: u32, row: u32) -> ScreenPoint {
        let step_x = rect.width() as f64 / self.cols as f64;
        let step_y = rect.height() as f64 / self.rows as f64;
        let tl = rect.top_left();
        let br = rect.bottom_right();
        let x = (tl.x as f64 + col as f64 * step_x + step_x / 2.0) as i32;
        let y = (tl.y as f64 + row as f64 * step_y + step_y / 2.0) as i32;
        ScreenPoint::new(x.clamp(tl.x, br.x - 1), y.clamp(tl.y, br.y - 1))
    }

    /// All (col, row) pairs in row-major order.
    pub fn cells_row_major(&self) -> impl Iterator<Item = (u32, u32)> {
        let cols = self.cols;
        (0..self.rows).flat_map(move |row| (0..cols).map(move |col| (col, row)))
    }
}

impl fmt::Display for GridSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.cols, self.rows)
    }
}
