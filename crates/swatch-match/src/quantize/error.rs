//! Error types for color quantization

use std::fmt;

/// Error type for k-means quantization.
#[derive(Debug, Clone, PartialEq)]
pub enum QuantizeError {
    /// No pixels were supplied
    EmptyInput,
    /// Zero clusters were requested
    ZeroClusters,
    /// `predict` was called before a successful `cluster`
    NotFitted,
}

impl fmt::Display for QuantizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuantizeError::EmptyInput => write!(f, "cannot quantize an empty pixel set"),
            QuantizeError::ZeroClusters => write!(f, "cluster count must be at least 1"),
            QuantizeError::NotFitted => {
                write!(f, "quantizer has no fitted centroids; call cluster() first")
            }
        }
    }
}

impl std::error::Error for QuantizeError {}
