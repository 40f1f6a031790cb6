//! Color quantization
//!
//! Reduces a pixel set to k representative colors with seeded k-means.

mod error;
mod kmeans;

pub use error::QuantizeError;
pub use kmeans::{Clustering, ColorQuantizer};
