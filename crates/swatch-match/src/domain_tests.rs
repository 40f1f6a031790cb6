//! Domain-critical regression tests for swatch-match.
//!
//! Each test documents the regression it guards against.

#[cfg(test)]
mod domain_tests {
    use std::collections::HashSet;

    use crate::color::Rgb;
    use crate::palette::ColorMatcher;
    use crate::quantize::ColorQuantizer;

    fn sample_colors() -> Vec<Rgb> {
        (0..64u32)
            .map(|i| Rgb::new((i * 37 % 256) as u8, (i * 91 % 256) as u8, (i * 53 % 256) as u8))
            .collect()
    }

    /// If this breaks, colors are being dropped from the assignment: every
    /// distinct input color must be a key whenever the palette is non-empty.
    #[test]
    fn test_map_is_total_for_non_empty_palette() {
        let colors: HashSet<Rgb> = sample_colors().into_iter().collect();
        let swatches = [
            (Rgb::new(0, 0, 0), 0usize),
            (Rgb::new(255, 255, 255), 1),
            (Rgb::new(200, 30, 30), 2),
        ];
        let map = ColorMatcher::new().map(colors.iter().copied(), &swatches);
        let keys: HashSet<Rgb> = map.keys().copied().collect();
        assert_eq!(keys, colors);
    }

    /// If this breaks, a single-swatch palette is not absorbing every color.
    #[test]
    fn test_single_swatch_absorbs_everything() {
        let swatches = [(Rgb::new(12, 34, 56), (7, 9))];
        let map = ColorMatcher::new().map(sample_colors(), &swatches);
        assert!(!map.is_empty());
        assert!(map.values().all(|&p| p == (7, 9)));
    }

    /// If this breaks, matching is happening in a non-perceptual space or the
    /// payloads are being paired with the wrong swatch.
    #[test]
    fn test_red_green_scenario() {
        let colors: HashSet<Rgb> = [Rgb::new(255, 0, 0), Rgb::new(0, 255, 0)].into();
        let swatches = [
            (Rgb::new(250, 10, 10), (5, 5)),
            (Rgb::new(10, 250, 10), (15, 15)),
        ];
        let map = ColorMatcher::new().map(colors, &swatches);
        assert_eq!(map.len(), 2);
        assert_eq!(map[&Rgb::new(255, 0, 0)], (5, 5));
        assert_eq!(map[&Rgb::new(0, 255, 0)], (15, 15));
    }

    /// If this breaks, quantized centroids no longer feed the matcher
    /// cleanly: every quantized color must map to some swatch.
    #[test]
    fn test_quantize_then_match_covers_all_cells() {
        let pixels = sample_colors();
        let mut quantizer = ColorQuantizer::new(11);
        let clustering = quantizer.cluster(&pixels, 6).unwrap();
        let distinct: HashSet<Rgb> = clustering.quantized().collect();

        let swatches = [(Rgb::new(0, 0, 0), 'k'), (Rgb::new(255, 255, 255), 'w')];
        let map = ColorMatcher::new().map(distinct.iter().copied(), &swatches);
        for color in clustering.quantized() {
            assert!(map.contains_key(&color), "{} missing from map", color);
        }
    }

    /// If this breaks, labels and centroids disagree: each pixel's centroid
    /// must be its nearest one in RGB.
    #[test]
    fn test_labels_point_at_nearest_centroid() {
        let pixels = sample_colors();
        let clustering = ColorQuantizer::new(5).cluster(&pixels, 4).unwrap();
        let d2 = |a: Rgb, b: Rgb| {
            let [r0, g0, b0] = a.to_f32();
            let [r1, g1, b1] = b.to_f32();
            (r0 - r1).powi(2) + (g0 - g1).powi(2) + (b0 - b1).powi(2)
        };
        for (pixel, &label) in pixels.iter().zip(&clustering.labels) {
            let own = d2(*pixel, clustering.centroids[label]);
            for &other in &clustering.centroids {
                // Centroids are rounded to 8 bits, allow for that slack
                assert!(own <= d2(*pixel, other) + 2000.0);
            }
        }
    }
}
