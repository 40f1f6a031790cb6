//! Nearest-swatch assignment in Oklab space.
//!
//! The matcher works over the *set* of distinct image colors. Each one is
//! assigned independently to the closest palette entry (nearest-centroid, not
//! a one-to-one matching), so several image colors may share a swatch.

use std::collections::HashMap;

use crate::color::{Oklab, Rgb};

/// Distance metric for palette color matching.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DistanceMetric {
    /// Squared Euclidean distance in Oklab space.
    #[default]
    Euclidean,

    /// HyAB hybrid distance with chroma coupling.
    ///
    /// Formula: `kl * |dL| + kc * sqrt(da² + db²) + kchroma * |C_pixel - C_palette|`
    ///
    /// Keeps near-grey image colors away from saturated swatches that happen
    /// to share their lightness.
    HyAB {
        /// Lightness weight
        kl: f32,
        /// Chrominance weight
        kc: f32,
        /// Chroma coupling weight
        kchroma: f32,
    },
}

impl DistanceMetric {
    /// HyAB with the weights that work well on small painted palettes.
    pub const HYAB_DEFAULT: DistanceMetric = DistanceMetric::HyAB {
        kl: 2.0,
        kc: 1.0,
        kchroma: 10.0,
    };

    #[inline]
    fn distance(self, pixel: Oklab, swatch: Oklab) -> f32 {
        match self {
            DistanceMetric::Euclidean => pixel.distance_squared(swatch),
            DistanceMetric::HyAB { kl, kc, kchroma } => {
                let dl = (pixel.l - swatch.l).abs();
                let da = pixel.a - swatch.a;
                let db = pixel.b - swatch.b;
                let chroma_penalty = (pixel.chroma() - swatch.chroma()).abs();
                kl * dl + kc * (da * da + db * db).sqrt() + kchroma * chroma_penalty
            }
        }
    }
}

/// Assigns image colors to the perceptually nearest palette swatch.
///
/// # Example
///
/// ```
/// use std::collections::HashSet;
/// use swatch_match::{ColorMatcher, Rgb};
///
/// let colors: HashSet<Rgb> = [Rgb::new(255, 0, 0), Rgb::new(0, 255, 0)].into();
/// let swatches = [(Rgb::new(250, 10, 10), (5, 5)), (Rgb::new(10, 250, 10), (15, 15))];
///
/// let map = ColorMatcher::new().map(colors, &swatches);
/// assert_eq!(map[&Rgb::new(255, 0, 0)], (5, 5));
/// assert_eq!(map[&Rgb::new(0, 255, 0)], (15, 15));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorMatcher {
    metric: DistanceMetric,
}

impl ColorMatcher {
    /// Matcher using Euclidean Oklab distance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Matcher using the given distance metric.
    pub fn with_metric(metric: DistanceMetric) -> Self {
        Self { metric }
    }

    /// The configured metric.
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Index of the nearest entry in `palette`, or `None` if it is empty.
    ///
    /// Linear scan with a strict comparison: on equal distances the first
    /// index wins.
    pub fn nearest(&self, color: Oklab, palette: &[Oklab]) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (i, &candidate) in palette.iter().enumerate() {
            let dist = self.metric.distance(color, candidate);
            match best {
                Some((_, best_dist)) if dist >= best_dist => {}
                _ => best = Some((i, dist)),
            }
        }
        best.map(|(i, _)| i)
    }

    /// Map every distinct image color to the payload of its nearest swatch.
    ///
    /// `swatches` pairs each palette color with an arbitrary payload, usually
    /// the screen point to click. The result contains every input color when
    /// `swatches` is non-empty and is empty otherwise.
    pub fn map<I, P>(&self, colors: I, swatches: &[(Rgb, P)]) -> HashMap<Rgb, P>
    where
        I: IntoIterator<Item = Rgb>,
        P: Copy,
    {
        if swatches.is_empty() {
            return HashMap::new();
        }

        // Palette side is converted once; it is tiny compared to the image set
        let palette: Vec<Oklab> = swatches.iter().map(|(c, _)| Oklab::from(*c)).collect();

        let mut mapping = HashMap::new();
        for color in colors {
            if mapping.contains_key(&color) {
                continue;
            }
            if let Some(idx) = self.nearest(Oklab::from(color), &palette) {
                mapping.insert(color, swatches[idx].1);
            }
        }
        mapping
    }
}
