//! Color types and conversion utilities
//!
//! - **Rgb**: 8-bit gamma-encoded color, as captured from screen or decoded
//!   from an image file.
//! - **LinearRgb**: linear light intensity.
//! - **Oklab**: perceptually uniform space used for nearest-swatch matching.
//!
//! # Example
//!
//! ```
//! use swatch_match::{LinearRgb, Oklab, Rgb};
//!
//! let rgb = Rgb::new(128, 64, 32);
//! let lab = Oklab::from(LinearRgb::from(rgb));
//! assert!(lab.l > 0.0 && lab.l < 1.0);
//! ```

mod linear_rgb;
mod lut;
mod oklab;
mod rgb;

pub use linear_rgb::LinearRgb;
pub use oklab::Oklab;
pub use rgb::Rgb;
