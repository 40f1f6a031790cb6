//! Seeded k-means over RGB pixels.
//!
//! Initialization follows k-means++: the first centroid is drawn uniformly,
//! each further one with probability proportional to the squared distance
//! to the nearest centroid chosen so far. Lloyd iterations then relocate the
//! centroids until they move less than the tolerance or the iteration cap is
//! reached. All randomness comes from a `StdRng` seeded at construction, so
//! equal inputs and seeds give equal clusterings.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::error::QuantizeError;
use crate::color::Rgb;

const DEFAULT_MAX_ITER: usize = 300;
const DEFAULT_TOLERANCE: f32 = 1e-4;

/// Result of a [`ColorQuantizer::cluster`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    /// One representative color per cluster, rounded to 8 bits
    pub centroids: Vec<Rgb>,
    /// Cluster index for each input pixel, in input order
    pub labels: Vec<usize>,
}

impl Clustering {
    /// The centroid color assigned to each input pixel.
    pub fn quantized(&self) -> impl Iterator<Item = Rgb> + '_ {
        self.labels.iter().map(move |&l| self.centroids[l])
    }
}

/// k-means color quantizer with an explicit seed.
///
/// # Example
///
/// ```
/// use swatch_match::{ColorQuantizer, Rgb};
///
/// let pixels = [Rgb::new(0, 0, 0), Rgb::new(2, 2, 2), Rgb::new(250, 250, 250)];
/// let mut quantizer = ColorQuantizer::new(7);
/// let clustering = quantizer.cluster(&pixels, 2).unwrap();
///
/// assert_eq!(clustering.centroids.len(), 2);
/// assert_eq!(clustering.labels[0], clustering.labels[1]);
/// assert_ne!(clustering.labels[0], clustering.labels[2]);
/// ```
#[derive(Debug, Clone)]
pub struct ColorQuantizer {
    seed: u64,
    max_iter: usize,
    tolerance: f32,
    fitted: Option<Vec<[f32; 3]>>,
}

impl ColorQuantizer {
    /// Create a quantizer whose initialization is driven by `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            max_iter: DEFAULT_MAX_ITER,
            tolerance: DEFAULT_TOLERANCE,
            fitted: None,
        }
    }

    /// Set the Lloyd iteration cap (minimum 1).
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter.max(1);
        self
    }

    /// Set the convergence threshold on summed squared centroid movement.
    pub fn tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance.max(0.0);
        self
    }

    /// The seed used for initialization.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Whether a clustering has been fitted.
    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Partition `pixels` into `k` groups.
    ///
    /// `k` is reduced to the pixel count when fewer pixels than clusters are
    /// supplied. On success the centroids are kept for [`predict`](Self::predict).
    ///
    /// # Errors
    ///
    /// [`QuantizeError::EmptyInput`] for an empty pixel slice and
    /// [`QuantizeError::ZeroClusters`] for `k == 0`.
    pub fn cluster(&mut self, pixels: &[Rgb], k: usize) -> Result<Clustering, QuantizeError> {
        if pixels.is_empty() {
            return Err(QuantizeError::EmptyInput);
        }
        if k == 0 {
            return Err(QuantizeError::ZeroClusters);
        }
        let k = k.min(pixels.len());

        let points: Vec<[f32; 3]> = pixels.iter().map(|p| p.to_f32()).collect();
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut centroids = init_plus_plus(&points, k, &mut rng);
        let mut labels = vec![0usize; points.len()];

        for _ in 0..self.max_iter {
            assign(&points, &centroids, &mut labels);
            let moved = relocate(&points, &labels, &mut centroids);
            if moved <= self.tolerance {
                break;
            }
        }
        assign(&points, &centroids, &mut labels);

        let clustering = Clustering {
            centroids: centroids.iter().map(|&c| Rgb::from_f32_rounded(c)).collect(),
            labels,
        };
        self.fitted = Some(centroids);
        Ok(clustering)
    }

    /// Label `pixels` against the most recently fitted centroids.
    ///
    /// # Errors
    ///
    /// [`QuantizeError::NotFitted`] if no `cluster` call has succeeded yet.
    pub fn predict(&self, pixels: &[Rgb]) -> Result<Vec<usize>, QuantizeError> {
        let centroids = self.fitted.as_ref().ok_or(QuantizeError::NotFitted)?;
        let points: Vec<[f32; 3]> = pixels.iter().map(|p| p.to_f32()).collect();
        let mut labels = vec![0usize; points.len()];
        assign(&points, centroids, &mut labels);
        Ok(labels)
    }
}

#[inline]
fn dist2(a: [f32; 3], b: [f32; 3]) -> f32 {
    let d0 = a[0] - b[0];
    let d1 = a[1] - b[1];
    let d2 = a[2] - b[2];
    d0 * d0 + d1 * d1 + d2 * d2
}

fn nearest(point: [f32; 3], centroids: &[[f32; 3]]) -> (usize, f32) {
    let mut best_idx = 0;
    let mut best_dist = f32::MAX;
    for (i, &c) in centroids.iter().enumerate() {
        let d = dist2(point, c);
        if d < best_dist {
            best_dist = d;
            best_idx = i;
        }
    }
    (best_idx, best_dist)
}

fn init_plus_plus(points: &[[f32; 3]], k: usize, rng: &mut StdRng) -> Vec<[f32; 3]> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.gen_range(0..points.len())]);

    let mut min_dist: Vec<f32> = points.iter().map(|&p| dist2(p, centroids[0])).collect();

    while centroids.len() < k {
        let total: f32 = min_dist.iter().sum();
        let next = if total > 0.0 {
            let mut target = rng.gen::<f32>() * total;
            let mut chosen = points.len() - 1;
            for (i, &d) in min_dist.iter().enumerate() {
                if target < d {
                    chosen = i;
                    break;
                }
                target -= d;
            }
            chosen
        } else {
            // Every point coincides with a centroid already
            rng.gen_range(0..points.len())
        };

        let c = points[next];
        centroids.push(c);
        for (d, &p) in min_dist.iter_mut().zip(points) {
            *d = d.min(dist2(p, c));
        }
    }
    centroids
}

fn assign(points: &[[f32; 3]], centroids: &[[f32; 3]], labels: &mut [usize]) {
    for (label, &p) in labels.iter_mut().zip(points) {
        *label = nearest(p, centroids).0;
    }
}

/// Move each centroid to the mean of its members and return the summed
/// squared movement. Empty clusters keep their previous position.
fn relocate(points: &[[f32; 3]], labels: &[usize], centroids: &mut [[f32; 3]]) -> f32 {
    let mut sums = vec![[0.0f64; 3]; centroids.len()];
    let mut counts = vec![0usize; centroids.len()];
    for (&p, &l) in points.iter().zip(labels) {
        sums[l][0] += p[0] as f64;
        sums[l][1] += p[1] as f64;
        sums[l][2] += p[2] as f64;
        counts[l] += 1;
    }

    let mut moved = 0.0;
    for (i, centroid) in centroids.iter_mut().enumerate() {
        if counts[i] == 0 {
            continue;
        }
        let n = counts[i] as f64;
        let updated = [
            (sums[i][0] / n) as f32,
            (sums[i][1] / n) as f32,
            (sums[i][2] / n) as f32,
        ];
        moved += dist2(*centroid, updated);
        *centroid = updated;
    }
    moved
}
