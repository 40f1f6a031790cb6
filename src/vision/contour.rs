//! Outer contours of binary shapes and polygon simplification.
//!
//! Foreground is 8-connected, background 4-connected. Only shapes that touch
//! the outer background are reported; shapes sitting inside a hole of another
//! shape are skipped.

use std::collections::VecDeque;

use image::GrayImage;

pub type Point = (i32, i32);

/// Clockwise (in screen coordinates) 8-neighbourhood, starting east.
const DIRS: [Point; 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// Axis-aligned box in pixel coordinates; `width`/`height` count pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

struct Mask<'a> {
    raw: &'a [u8],
    width: i32,
    height: i32,
}

impl Mask<'_> {
    #[inline]
    fn fg(&self, x: i32, y: i32) -> bool {
        x >= 0
            && y >= 0
            && x < self.width
            && y < self.height
            && self.raw[(y * self.width + x) as usize] != 0
    }

    #[inline]
    fn idx(&self, x: i32, y: i32) -> usize {
        (y * self.width + x) as usize
    }
}

/// Outer boundary of every external shape, in raster order of their
/// top-left-most pixel.
pub fn external_contours(bin: &GrayImage) -> Vec<Vec<Point>> {
    let (w, h) = bin.dimensions();
    let mask = Mask {
        raw: bin.as_raw(),
        width: w as i32,
        height: h as i32,
    };
    if w == 0 || h == 0 {
        return Vec::new();
    }

    let outside = outer_background(&mask);
    let mut label = vec![false; (w * h) as usize];
    let mut contours = Vec::new();

    for y in 0..mask.height {
        for x in 0..mask.width {
            if !mask.fg(x, y) || label[mask.idx(x, y)] {
                continue;
            }
            let external = flood_component(&mask, &outside, &mut label, (x, y));
            if external {
                contours.push(trace_border(&mask, (x, y)));
            }
        }
    }
    contours
}

/// Background reachable from the image frame through 4-connected steps.
fn outer_background(mask: &Mask) -> Vec<bool> {
    let mut seen = vec![false; (mask.width * mask.height) as usize];
    let mut queue = VecDeque::new();
    for x in 0..mask.width {
        for y in [0, mask.height - 1] {
            if !mask.fg(x, y) && !seen[mask.idx(x, y)] {
                seen[mask.idx(x, y)] = true;
                queue.push_back((x, y));
            }
        }
    }
    for y in 0..mask.height {
        for x in [0, mask.width - 1] {
            if !mask.fg(x, y) && !seen[mask.idx(x, y)] {
                seen[mask.idx(x, y)] = true;
                queue.push_back((x, y));
            }
        }
    }
    while let Some((x, y)) = queue.pop_front() {
        for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            let (nx, ny) = (x + dx, y + dy);
            if nx < 0 || ny < 0 || nx >= mask.width || ny >= mask.height {
                continue;
            }
            let i = mask.idx(nx, ny);
            if !mask.fg(nx, ny) && !seen[i] {
                seen[i] = true;
                queue.push_back((nx, ny));
            }
        }
    }
    seen
}

/// Label one 8-connected component; returns whether it borders the outside.
fn flood_component(mask: &Mask, outside: &[bool], label: &mut [bool], start: Point) -> bool {
    let mut external = false;
    let mut queue = VecDeque::from([start]);
    label[mask.idx(start.0, start.1)] = true;

    while let Some((x, y)) = queue.pop_front() {
        if x == 0 || y == 0 || x == mask.width - 1 || y == mask.height - 1 {
            external = true;
        }
        for (i, &(dx, dy)) in DIRS.iter().enumerate() {
            let (nx, ny) = (x + dx, y + dy);
            if nx < 0 || ny < 0 || nx >= mask.width || ny >= mask.height {
                continue;
            }
            let n = mask.idx(nx, ny);
            if mask.fg(nx, ny) {
                if !label[n] {
                    label[n] = true;
                    queue.push_back((nx, ny));
                }
            } else if i % 2 == 0 && outside[n] {
                external = true;
            }
        }
    }
    external
}

fn scan(mask: &Mask, p: Point, from: usize) -> Option<usize> {
    (0..8)
        .map(|i| (from + i) % 8)
        .find(|&d| mask.fg(p.0 + DIRS[d].0, p.1 + DIRS[d].1))
}

/// Moore-neighbour tracing from the top-left-most pixel of a shape.
fn trace_border(mask: &Mask, start: Point) -> Vec<Point> {
    let mut points = vec![start];
    // Nothing lies west, north-west, north or north-east of the start pixel
    let Some(first_dir) = scan(mask, start, 4) else {
        return points;
    };

    let limit = (mask.width as usize * mask.height as usize) * 4 + 8;
    let mut p = start;
    let mut dir = first_dir;
    for _ in 0..limit {
        p = (p.0 + DIRS[dir].0, p.1 + DIRS[dir].1);
        let Some(next) = scan(mask, p, (dir + 5) % 8) else {
            break;
        };
        if p == start && next == first_dir {
            break;
        }
        points.push(p);
        dir = next;
    }
    points
}

/// Perimeter of a polyline; `closed` adds the segment back to the start.
pub fn arc_length(points: &[Point], closed: bool) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let seg = |a: Point, b: Point| {
        let dx = (a.0 - b.0) as f64;
        let dy = (a.1 - b.1) as f64;
        (dx * dx + dy * dy).sqrt()
    };
    let mut total: f64 = points.windows(2).map(|w| seg(w[0], w[1])).sum();
    if closed {
        total += seg(points[points.len() - 1], points[0]);
    }
    total
}

fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = ((b.0 - a.0) as f64, (b.1 - a.1) as f64);
    let (px, py) = ((p.0 - a.0) as f64, (p.1 - a.1) as f64);
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        (px * px + py * py).sqrt()
    } else {
        (dx * py - dy * px).abs() / len
    }
}

/// Douglas-Peucker over an open chain, keeping both endpoints.
fn simplify_chain(chain: &[Point], epsilon: f64, out: &mut Vec<Point>) {
    let last = chain.len() - 1;
    let (a, b) = (chain[0], chain[last]);
    let mut far = 0;
    let mut far_dist = 0.0;
    for (i, &p) in chain.iter().enumerate().take(last).skip(1) {
        let d = perpendicular_distance(p, a, b);
        if d > far_dist {
            far_dist = d;
            far = i;
        }
    }
    if far_dist > epsilon {
        simplify_chain(&chain[..=far], epsilon, out);
        out.pop();
        simplify_chain(&chain[far..], epsilon, out);
    } else {
        out.push(a);
        out.push(b);
    }
}

/// Simplify a closed contour to a polygon whose edges stay within
/// `epsilon` of the original points.
///
/// The contour is split at the point farthest from its first point and each
/// half is simplified independently.
pub fn approx_polygon(contour: &[Point], epsilon: f64) -> Vec<Point> {
    if contour.len() < 3 {
        return contour.to_vec();
    }
    let start = contour[0];
    let dist2 = |p: Point| {
        let dx = (p.0 - start.0) as i64;
        let dy = (p.1 - start.1) as i64;
        dx * dx + dy * dy
    };
    let far = (1..contour.len())
        .max_by_key(|&i| (dist2(contour[i]), std::cmp::Reverse(i)))
        .unwrap_or(0);
    if far == 0 {
        return vec![start];
    }

    let mut out = Vec::new();
    simplify_chain(&contour[..=far], epsilon, &mut out);
    out.pop();

    let mut back: Vec<Point> = contour[far..].to_vec();
    back.push(start);
    simplify_chain(&back, epsilon, &mut out);
    out.pop();

    out.dedup();
    out
}

/// Tight box around `points`.
pub fn bounding_rect(points: &[Point]) -> Option<BoundingBox> {
    let first = points.first()?;
    let (mut x1, mut y1, mut x2, mut y2) = (first.0, first.1, first.0, first.1);
    for &(x, y) in points {
        x1 = x1.min(x);
        y1 = y1.min(y);
        x2 = x2.max(x);
        y2 = y2.max(y);
    }
    Some(BoundingBox {
        x: x1,
        y: y1,
        width: x2 - x1 + 1,
        height: y2 - y1 + 1,
    })
}
