//! Oklab perceptual color space
//!
//! Euclidean distance in Oklab tracks perceived color difference far better
//! than distance in RGB, which is what makes nearest-swatch assignment
//! behave on muted or dark palettes.
//!
//! # References
//!
//! Björn Ottosson, "A perceptual color space for image processing"
//! <https://bottosson.github.io/posts/oklab/>

use super::linear_rgb::LinearRgb;
use super::rgb::Rgb;

/// A color in Oklab perceptual color space.
///
/// - `l`: Lightness (0.0 = black, 1.0 = white)
/// - `a`: Green-red axis (negative = green, positive = red)
/// - `b`: Blue-yellow axis (negative = blue, positive = yellow)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Oklab {
    /// Lightness: 0.0 (black) to 1.0 (white)
    pub l: f32,
    /// Green-red axis: typically -0.5 to 0.5
    pub a: f32,
    /// Blue-yellow axis: typically -0.5 to 0.5
    pub b: f32,
}

impl Oklab {
    /// Create a new Oklab color.
    #[inline]
    pub fn new(l: f32, a: f32, b: f32) -> Self {
        Self { l, a, b }
    }

    /// Squared Euclidean distance in Oklab space.
    ///
    /// # Example
    ///
    /// ```
    /// use swatch_match::Oklab;
    ///
    /// let white = Oklab::new(1.0, 0.0, 0.0);
    /// let black = Oklab::new(0.0, 0.0, 0.0);
    /// assert!((white.distance_squared(black) - 1.0).abs() < 1e-6);
    /// ```
    #[inline]
    pub fn distance_squared(self, other: Oklab) -> f32 {
        let dl = self.l - other.l;
        let da = self.a - other.a;
        let db = self.b - other.b;
        dl * dl + da * da + db * db
    }

    /// HyAB distance (Abasi et al., 2020): Manhattan lightness plus
    /// Euclidean chrominance.
    ///
    /// `distance = kl * |L1 - L2| + sqrt((a1-a2)^2 + (b1-b2)^2)`
    #[inline]
    pub fn hyab_distance(self, other: Oklab, kl: f32) -> f32 {
        let dl = (self.l - other.l).abs();
        let da = self.a - other.a;
        let db = self.b - other.b;
        kl * dl + (da * da + db * db).sqrt()
    }

    /// Chroma magnitude `sqrt(a^2 + b^2)`.
    #[inline]
    pub fn chroma(self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }
}

impl From<LinearRgb> for Oklab {
    /// Uses the 2021-01-25 matrices from Björn Ottosson.
    fn from(rgb: LinearRgb) -> Self {
        // Linear sRGB to LMS (M1)
        let l = 0.4122214708 * rgb.r + 0.5363325363 * rgb.g + 0.0514459929 * rgb.b;
        let m = 0.2119034982 * rgb.r + 0.6806995451 * rgb.g + 0.1073969566 * rgb.b;
        let s = 0.0883024619 * rgb.r + 0.2817188376 * rgb.g + 0.6299787005 * rgb.b;

        let l_ = l.cbrt();
        let m_ = m.cbrt();
        let s_ = s.cbrt();

        // LMS to Lab (M2)
        Oklab {
            l: 0.2104542553 * l_ + 0.7936177850 * m_ - 0.0040720468 * s_,
            a: 1.9779984951 * l_ - 2.4285922050 * m_ + 0.4505937099 * s_,
            b: 0.0259040371 * l_ + 0.7827717662 * m_ - 0.8086757660 * s_,
        }
    }
}

impl From<Rgb> for Oklab {
    fn from(rgb: Rgb) -> Self {
        Oklab::from(LinearRgb::from(rgb))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PALETTE_TOLERANCE: f32 = 1e-5;

    fn approx_eq(a: f32, b: f32, tol: f32) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_oklab_matches_palette_crate() {
        use palette::{IntoColor, LinSrgb, Oklab as PaletteOklab};

        let test_colors = [
            (1.0, 0.0, 0.0),
            (0.0, 1.0, 0.0),
            (0.0, 0.0, 1.0),
            (0.5, 0.5, 0.5),
            (1.0, 1.0, 1.0),
            (0.0, 0.0, 0.0),
        ];

        for (r, g, b) in test_colors {
            let ours = Oklab::from(LinearRgb::new(r, g, b));
            let lin: LinSrgb<f32> = LinSrgb::new(r, g, b);
            let theirs: PaletteOklab<f32> = lin.into_color();

            assert!(
                approx_eq(ours.l, theirs.l, PALETTE_TOLERANCE)
                    && approx_eq(ours.a, theirs.a, PALETTE_TOLERANCE)
                    && approx_eq(ours.b, theirs.b, PALETTE_TOLERANCE),
                "mismatch for ({}, {}, {}): ours={:?}, palette=({}, {}, {})",
                r,
                g,
                b,
                ours,
                theirs.l,
                theirs.a,
                theirs.b
            );
        }
    }

    #[test]
    fn test_gray_has_no_chroma() {
        for v in [0u8, 64, 128, 200, 255] {
            let lab = Oklab::from(Rgb::new(v, v, v));
            assert!(lab.chroma() < 1e-3, "gray {} has chroma {}", v, lab.chroma());
        }
    }

    #[test]
    fn test_white_and_black_lightness() {
        let white = Oklab::from(Rgb::new(255, 255, 255));
        let black = Oklab::from(Rgb::new(0, 0, 0));
        assert!(approx_eq(white.l, 1.0, 1e-4), "white L = {}", white.l);
        assert!(approx_eq(black.l, 0.0, 1e-6), "black L = {}", black.l);
    }

    #[test]
    fn test_hyab_distance_known_values() {
        let black = Oklab::new(0.0, 0.0, 0.0);
        let white = Oklab::new(1.0, 0.0, 0.0);
        assert!((black.hyab_distance(white, 2.0) - 2.0).abs() < 1e-6);

        let a = Oklab::new(0.5, 0.1, 0.0);
        let b = Oklab::new(0.5, -0.1, 0.0);
        assert!((a.hyab_distance(b, 2.0) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_distance_squared_chromatic() {
        let red_ish = Oklab::new(0.5, 0.2, 0.0);
        let blue_ish = Oklab::new(0.5, 0.0, -0.2);
        assert!((red_ish.distance_squared(blue_ish) - 0.08).abs() < 1e-6);
        assert!(red_ish.distance_squared(red_ish) < 1e-10);
    }
}
