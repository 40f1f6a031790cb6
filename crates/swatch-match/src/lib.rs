//! swatch-match: perceptual palette matching and color quantization
//!
//! Two building blocks for reproducing an image with a small, fixed set of
//! selectable colors:
//!
//! - [`ColorQuantizer`]: seeded k-means that reduces a pixel set to k
//!   representative colors.
//! - [`ColorMatcher`]: assigns each distinct image color to the nearest
//!   palette swatch in Oklab space.
//!
//! # Quick Start
//!
//! ```
//! use std::collections::HashSet;
//! use swatch_match::{ColorMatcher, ColorQuantizer, Rgb};
//!
//! let pixels = vec![Rgb::new(250, 5, 5), Rgb::new(245, 0, 10), Rgb::new(5, 5, 240)];
//! let clustering = ColorQuantizer::new(42).cluster(&pixels, 2).unwrap();
//! let distinct: HashSet<Rgb> = clustering.quantized().collect();
//!
//! let swatches = [(Rgb::new(255, 0, 0), "red"), (Rgb::new(0, 0, 255), "blue")];
//! let map = ColorMatcher::new().map(distinct, &swatches);
//! assert_eq!(map[&clustering.centroids[clustering.labels[0]]], "red");
//! ```
//!
//! # Color Spaces
//!
//! - [`Rgb`]: 8-bit gamma-encoded input, hashable and ordered
//! - [`LinearRgb`]: linear light, the step between sRGB and Oklab
//! - [`Oklab`]: perceptually uniform distances for matching
//!
//! Clustering runs on raw RGB channel values; matching runs in Oklab. The
//! quantizer only has to separate the colors an image actually contains, while
//! the matcher has to decide which of a handful of painted swatches *looks*
//! closest.

#![allow(clippy::excessive_precision)]

pub mod color;
pub mod palette;
pub mod quantize;

#[cfg(test)]
mod domain_tests;

pub use color::{LinearRgb, Oklab, Rgb};
pub use palette::{ColorMatcher, DistanceMetric};
pub use quantize::{Clustering, ColorQuantizer, QuantizeError};
