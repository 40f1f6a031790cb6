//! Palette matching
//!
//! Assignment of image colors to the swatches of a detected palette.

mod matcher;

pub use matcher::{ColorMatcher, DistanceMetric};
