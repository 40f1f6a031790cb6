//! Circle detection with the gradient Hough transform.
//!
//! Edges come from a Canny pass (L1 gradient magnitude, non-maximum
//! suppression, hysteresis). Each edge pixel votes along its gradient
//! direction, both ways, for every radius in the band; accumulator peaks
//! above the vote threshold become centers, and each center's radius is the
//! band value supported by the most edge pixels.

use std::collections::VecDeque;

use image::GrayImage;

use super::filter::{sobel, Gradients};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoughParams {
    /// Inverse accumulator resolution (1.0 = image resolution)
    pub dp: f64,
    /// Minimum distance between detected centers
    pub min_dist: f64,
    /// Upper Canny threshold; the lower one is half of it
    pub param1: f64,
    /// Accumulator votes needed for a center
    pub param2: f64,
    pub min_radius: u32,
    pub max_radius: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

/// Canny edge map. Returns one flag per pixel.
pub(crate) fn canny(grads: &Gradients, low: f64, high: f64) -> Vec<bool> {
    let (w, h) = (grads.width, grads.height);
    let mag: Vec<i32> = grads
        .dx
        .iter()
        .zip(&grads.dy)
        .map(|(dx, dy)| dx.abs() + dy.abs())
        .collect();
    let at = |x: isize, y: isize| -> i32 {
        if x < 0 || y < 0 || x >= w as isize || y >= h as isize {
            0
        } else {
            mag[y as usize * w + x as usize]
        }
    };

    // tan(22.5°) and tan(67.5°)
    const TAN_22: f64 = 0.414_213_56;
    const TAN_67: f64 = 2.414_213_56;

    let mut strong = VecDeque::new();
    let mut weak = vec![false; w * h];
    let mut edges = vec![false; w * h];

    for y in 0..h {
        for x in 0..w {
            let i = y * w + x;
            let m = mag[i];
            if (m as f64) <= low {
                continue;
            }
            let (dx, dy) = (grads.dx[i] as f64, grads.dy[i] as f64);
            let (ax, ay) = (dx.abs(), dy.abs());
            let (xi, yi) = (x as isize, y as isize);
            let (a, b) = if ay <= ax * TAN_22 {
                (at(xi - 1, yi), at(xi + 1, yi))
            } else if ay > ax * TAN_67 {
                (at(xi, yi - 1), at(xi, yi + 1))
            } else if dx * dy > 0.0 {
                (at(xi - 1, yi - 1), at(xi + 1, yi + 1))
            } else {
                (at(xi + 1, yi - 1), at(xi - 1, yi + 1))
            };
            if m > a && m >= b {
                if (m as f64) > high {
                    edges[i] = true;
                    strong.push_back((x, y));
                } else {
                    weak[i] = true;
                }
            }
        }
    }

    while let Some((x, y)) = strong.pop_front() {
        for dy in -1isize..=1 {
            for dx in -1isize..=1 {
                let (nx, ny) = (x as isize + dx, y as isize + dy);
                if nx < 0 || ny < 0 || nx >= w as isize || ny >= h as isize {
                    continue;
                }
                let n = ny as usize * w + nx as usize;
                if weak[n] && !edges[n] {
                    edges[n] = true;
                    strong.push_back((nx as usize, ny as usize));
                }
            }
        }
    }
    edges
}

/// Detect circles in a grayscale image, strongest first.
pub fn hough_circles(gray: &GrayImage, params: &HoughParams) -> Vec<Circle> {
    let grads = sobel(gray);
    let (w, h) = (grads.width, grads.height);
    if w == 0 || h == 0 || params.max_radius < params.min_radius {
        return Vec::new();
    }
    let edges = canny(&grads, (params.param1 / 2.0).max(1.0), params.param1);

    let dp = params.dp.max(1.0);
    let aw = (w as f64 / dp).ceil() as usize;
    let ah = (h as f64 / dp).ceil() as usize;
    let mut acc = vec![0u32; aw * ah];
    let mut edge_points = Vec::new();

    for y in 0..h {
        for x in 0..w {
            if !edges[y * w + x] {
                continue;
            }
            edge_points.push((x as f64, y as f64));
            let (dx, dy) = grads.at(x, y);
            let norm = ((dx * dx + dy * dy) as f64).sqrt();
            if norm == 0.0 {
                continue;
            }
            let (vx, vy) = (dx as f64 / norm, dy as f64 / norm);
            for sign in [-1.0, 1.0] {
                for r in params.min_radius..=params.max_radius {
                    let cx = x as f64 + sign * r as f64 * vx;
                    let cy = y as f64 + sign * r as f64 * vy;
                    let ax = (cx / dp).floor();
                    let ay = (cy / dp).floor();
                    if ax < 0.0 || ay < 0.0 || ax >= aw as f64 || ay >= ah as f64 {
                        continue;
                    }
                    acc[ay as usize * aw + ax as usize] += 1;
                }
            }
        }
    }

    let mut peaks = local_maxima(&acc, aw, ah, params.param2);
    peaks.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

    let min_dist2 = params.min_dist * params.min_dist;
    let mut circles: Vec<Circle> = Vec::new();
    for (_, idx) in peaks {
        let cx = ((idx % aw) as f64 + 0.5) * dp;
        let cy = ((idx / aw) as f64 + 0.5) * dp;
        let too_close = circles.iter().any(|c| {
            let (ddx, ddy) = (c.x - cx, c.y - cy);
            ddx * ddx + ddy * ddy < min_dist2
        });
        if too_close {
            continue;
        }
        if let Some(radius) = estimate_radius(cx, cy, &edge_points, params) {
            circles.push(Circle {
                x: cx,
                y: cy,
                radius,
            });
        }
    }
    circles
}

/// Accumulator cells above `threshold` that beat their 4-neighbours.
/// Returns `(votes, index)` pairs.
fn local_maxima(acc: &[u32], aw: usize, ah: usize, threshold: f64) -> Vec<(u32, usize)> {
    let get = |x: isize, y: isize| -> u32 {
        if x < 0 || y < 0 || x >= aw as isize || y >= ah as isize {
            0
        } else {
            acc[y as usize * aw + x as usize]
        }
    };
    let mut peaks = Vec::new();
    for y in 0..ah as isize {
        for x in 0..aw as isize {
            let v = get(x, y);
            if (v as f64) <= threshold {
                continue;
            }
            if v > get(x - 1, y) && v >= get(x + 1, y) && v > get(x, y - 1) && v >= get(x, y + 1) {
                peaks.push((v, y as usize * aw + x as usize));
            }
        }
    }
    peaks
}

fn estimate_radius(cx: f64, cy: f64, edge_points: &[(f64, f64)], params: &HoughParams) -> Option<f64> {
    let lo = params.min_radius as f64 - 0.5;
    let hi = params.max_radius as f64 + 0.5;
    let bins = (params.max_radius - params.min_radius + 1) as usize;
    let mut hist = vec![0u32; bins];
    for &(x, y) in edge_points {
        let d = ((x - cx).powi(2) + (y - cy).powi(2)).sqrt();
        if d >= lo && d < hi {
            let bin = ((d - lo).floor() as usize).min(bins - 1);
            hist[bin] += 1;
        }
    }
    let (best, &count) = hist
        .iter()
        .enumerate()
        .max_by_key(|&(i, &c)| (c, std::cmp::Reverse(i)))?;
    if (count as f64) < params.param2 {
        return None;
    }
    Some((params.min_radius as usize + best) as f64)
}
