use thiserror::Error;

use crate::models::Rect;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Capture region {0} is not on the selected display")]
    InvalidRegion(Rect),

    #[error("Display {0} not found")]
    NoDisplay(usize),

    #[error("Capture backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum ClickError {
    #[error("Pointer backend error: {0}")]
    Backend(String),

    #[error("Fail-safe triggered: pointer parked at screen origin")]
    FailSafe,
}

#[derive(Debug, Error)]
pub enum PickError {
    #[error("Pick cancelled")]
    Cancelled,

    #[error("Invalid rectangle: top-left must be above and left of bottom-right")]
    InvalidRect,
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Failed to open image: {0}")]
    Open(#[from] image::ImageError),

    #[error("Image has no pixels")]
    Empty,

    #[error("Quantization failed: {0}")]
    Quantize(#[from] swatch_match::QuantizeError),
}

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("PNG encode error: {0}")]
    Encode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_error_invalid_region() {
        let rect = Rect::from_coords(0, 0, 10, 20).unwrap();
        let error = CaptureError::InvalidRegion(rect);
        assert_eq!(
            error.to_string(),
            "Capture region (0, 0)-(10, 20) is not on the selected display"
        );
    }

    #[test]
    fn test_capture_error_no_display() {
        let error = CaptureError::NoDisplay(3);
        assert_eq!(error.to_string(), "Display 3 not found");
    }

    #[test]
    fn test_click_error_fail_safe() {
        let error = ClickError::FailSafe;
        assert_eq!(
            error.to_string(),
            "Fail-safe triggered: pointer parked at screen origin"
        );
    }

    #[test]
    fn test_click_error_backend() {
        let error = ClickError::Backend("no X server".to_string());
        assert_eq!(error.to_string(), "Pointer backend error: no X server");
    }

    #[test]
    fn test_pick_error_cancelled() {
        assert_eq!(PickError::Cancelled.to_string(), "Pick cancelled");
    }

    #[test]
    fn test_image_error_from_quantize_error() {
        let error: ImageError = swatch_match::QuantizeError::EmptyInput.into();
        match error {
            ImageError::Quantize(_) => {}
            _ => panic!("Expected Quantize variant"),
        }
    }

    #[test]
    fn test_preview_error_encode() {
        let error = PreviewError::Encode("bad header".to_string());
        assert_eq!(error.to_string(), "PNG encode error: bad header");
    }
}
