//! Screen capture collaborator.

use image::{DynamicImage, RgbImage};
use screenshots::Screen;

use crate::error::CaptureError;
use crate::models::{Rect, ScreenPoint};

/// A captured pixel buffer and the screen position of its top-left pixel.
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: RgbImage,
    pub origin: ScreenPoint,
}

impl Frame {
    pub fn new(image: RgbImage, origin: ScreenPoint) -> Self {
        Self { image, origin }
    }

    /// Screen coordinates of image pixel (x, y).
    pub fn to_screen(&self, x: i32, y: i32) -> ScreenPoint {
        self.origin.offset(x, y)
    }

    /// Image coordinates of a screen point; may fall outside the image.
    pub fn to_local(&self, p: ScreenPoint) -> (i32, i32) {
        (p.x - self.origin.x, p.y - self.origin.y)
    }

    /// Screen area covered by the frame; `None` for an empty image.
    pub fn bounds(&self) -> Option<Rect> {
        Rect::new(
            self.origin,
            self.origin
                .offset(self.image.width() as i32, self.image.height() as i32),
        )
    }
}

/// Supplies pixels for a screen region, or the whole display for `None`.
pub trait ScreenCapture: Send {
    fn capture(&self, region: Option<Rect>) -> Result<Frame, CaptureError>;
}

/// Capture backed by the `screenshots` crate, bound to one display.
pub struct ScreenshotsCapture {
    monitor: usize,
}

impl ScreenshotsCapture {
    pub fn new(monitor: usize) -> Self {
        Self { monitor }
    }

    fn screen(&self) -> Result<Screen, CaptureError> {
        let screens = Screen::all().map_err(|e| CaptureError::Backend(e.to_string()))?;
        tracing::debug!(displays = screens.len(), monitor = self.monitor, "Enumerated displays");
        screens
            .into_iter()
            .nth(self.monitor)
            .ok_or(CaptureError::NoDisplay(self.monitor))
    }
}

impl ScreenCapture for ScreenshotsCapture {
    fn capture(&self, region: Option<Rect>) -> Result<Frame, CaptureError> {
        let screen = self.screen()?;
        let (dx, dy) = (screen.display_info.x, screen.display_info.y);
        let (dw, dh) = (screen.display_info.width, screen.display_info.height);
        let display_origin = ScreenPoint::new(dx, dy);

        let (rgba, origin) = match region {
            None => {
                let img = screen
                    .capture()
                    .map_err(|e| CaptureError::Backend(e.to_string()))?;
                (img, display_origin)
            }
            Some(rect) => {
                let display = Rect::new(display_origin, display_origin.offset(dw as i32, dh as i32))
                    .ok_or(CaptureError::NoDisplay(self.monitor))?;
                let tl = rect.top_left();
                let br = rect.bottom_right();
                if !display.contains(tl) || !display.contains(br.offset(-1, -1)) {
                    return Err(CaptureError::InvalidRegion(rect));
                }
                // capture_area takes display-local coordinates
                let img = screen
                    .capture_area(tl.x - dx, tl.y - dy, rect.width(), rect.height())
                    .map_err(|e| CaptureError::Backend(e.to_string()))?;
                (img, tl)
            }
        };

        let image = DynamicImage::ImageRgba8(rgba).to_rgb8();
        tracing::debug!(
            width = image.width(),
            height = image.height(),
            x = origin.x,
            y = origin.y,
            "Captured screen"
        );
        Ok(Frame::new(image, origin))
    }
}
