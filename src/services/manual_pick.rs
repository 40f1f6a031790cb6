//! Manual point and rectangle picking.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;

use crate::error::PickError;
use crate::models::{Rect, ScreenPoint};

use super::run_state::RunState;

/// Asks the user to point at things on screen.
pub trait ManualPick: Send {
    /// Block until the user picks a point, or fail with `Cancelled` on stop.
    fn get_point(&mut self, prompt: &str) -> Result<ScreenPoint, PickError>;

    /// Pick top-left then bottom-right. The second point must lie strictly
    /// below and right of the first.
    fn get_rect(&mut self, what: &str) -> Result<Rect, PickError> {
        let tl = self.get_point(&format!("Click the TOP-LEFT corner of the {}", what))?;
        let br = self.get_point(&format!("Click the BOTTOM-RIGHT corner of the {}", what))?;
        Rect::new(tl, br).ok_or(PickError::InvalidRect)
    }
}

/// Picker fed by left clicks observed by the control listener.
pub struct ClickPicker {
    clicks: Receiver<ScreenPoint>,
    state: Arc<RunState>,
}

impl ClickPicker {
    pub fn new(clicks: Receiver<ScreenPoint>, state: Arc<RunState>) -> Self {
        Self { clicks, state }
    }
}

impl ManualPick for ClickPicker {
    fn get_point(&mut self, prompt: &str) -> Result<ScreenPoint, PickError> {
        // Clicks made before the prompt belong to something else.
        while self.clicks.try_recv().is_ok() {}

        tracing::info!("{}", prompt);
        loop {
            if self.state.is_stopped() {
                return Err(PickError::Cancelled);
            }
            match self.clicks.recv_timeout(self.state.poll_interval()) {
                Ok(point) => {
                    if self.state.is_paused() {
                        continue;
                    }
                    tracing::info!(x = point.x, y = point.y, "Point picked");
                    return Ok(point);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return Err(PickError::Cancelled),
            }
        }
    }
}
