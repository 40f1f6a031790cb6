//! In-memory collaborators for driving the controller without a display.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::imageops::crop_imm;
use image::RgbImage;

use gridpaint::error::{CaptureError, ClickError, PickError};
use gridpaint::models::{Rect, ScreenPoint};
use gridpaint::services::{Frame, ManualPick, Pointer, PreviewConfirmation, PreviewDecision, RunState, ScreenCapture};

/// Serves crops of a fixed screen image whose top-left is `origin`.
pub struct FakeCapture {
    screen: RgbImage,
    origin: ScreenPoint,
    fail: bool,
    pub regions: Arc<Mutex<Vec<Option<Rect>>>>,
}

impl FakeCapture {
    pub fn new(screen: RgbImage) -> Self {
        Self {
            screen,
            origin: ScreenPoint::new(0, 0),
            fail: false,
            regions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(RgbImage::new(1, 1))
        }
    }
}

impl ScreenCapture for FakeCapture {
    fn capture(&self, region: Option<Rect>) -> Result<Frame, CaptureError> {
        self.regions.lock().unwrap().push(region);
        if self.fail {
            return Err(CaptureError::Backend("fake backend down".to_string()));
        }
        let full = Frame::new(self.screen.clone(), self.origin);
        let Some(rect) = region else {
            return Ok(full);
        };
        let bounds = full.bounds().ok_or(CaptureError::InvalidRegion(rect))?;
        if !bounds.contains(rect.top_left()) || !bounds.contains(rect.bottom_right().offset(-1, -1)) {
            return Err(CaptureError::InvalidRegion(rect));
        }
        let (x, y) = full.to_local(rect.top_left());
        let img = crop_imm(&self.screen, x as u32, y as u32, rect.width(), rect.height()).to_image();
        Ok(Frame::new(img, rect.top_left()))
    }
}

/// Records every click. Can fail or raise Stop after a number of clicks.
pub struct RecordingPointer {
    pub clicks: Arc<Mutex<Vec<ScreenPoint>>>,
    fail_on: Option<usize>,
    stop_after: Option<(usize, Arc<RunState>)>,
    pause_after: Option<(usize, Arc<RunState>)>,
}

impl RecordingPointer {
    pub fn new() -> Self {
        Self {
            clicks: Arc::new(Mutex::new(Vec::new())),
            fail_on: None,
            stop_after: None,
            pause_after: None,
        }
    }

    /// The `n`th click (1-based) fails and is not recorded.
    pub fn failing_on(mut self, n: usize) -> Self {
        self.fail_on = Some(n);
        self
    }

    /// Stop `state` right after the `n`th click.
    pub fn stopping_after(mut self, n: usize, state: Arc<RunState>) -> Self {
        self.stop_after = Some((n, state));
        self
    }

    /// Pause `state` right after the `n`th click.
    pub fn pausing_after(mut self, n: usize, state: Arc<RunState>) -> Self {
        self.pause_after = Some((n, state));
        self
    }
}

impl Pointer for RecordingPointer {
    fn click(&mut self, at: ScreenPoint, _delay_after: Duration) -> Result<(), ClickError> {
        let mut clicks = self.clicks.lock().unwrap();
        if self.fail_on == Some(clicks.len() + 1) {
            return Err(ClickError::Backend("fake click failure".to_string()));
        }
        clicks.push(at);
        if let Some((n, state)) = &self.stop_after {
            if clicks.len() == *n {
                state.stop();
            }
        }
        if let Some((n, state)) = &self.pause_after {
            if clicks.len() == *n {
                state.toggle_pause();
            }
        }
        Ok(())
    }
}

/// Returns pre-scripted picks in order; cancels once exhausted.
pub struct ScriptedPicker {
    picks: VecDeque<Result<ScreenPoint, PickError>>,
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedPicker {
    pub fn new(points: &[(i32, i32)]) -> Self {
        Self {
            picks: points.iter().map(|&p| Ok(ScreenPoint::from(p))).collect(),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn none() -> Self {
        Self::new(&[])
    }
}

impl ManualPick for ScriptedPicker {
    fn get_point(&mut self, prompt: &str) -> Result<ScreenPoint, PickError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.picks.pop_front().unwrap_or(Err(PickError::Cancelled))
    }
}

/// Answers the preview prompt from a script; `stop` ends the run instead.
///
/// `early` holds keys pressed before the preview appeared. They are answered
/// first unless the controller discards them.
pub struct ScriptedConfirmation {
    early: VecDeque<PreviewDecision>,
    answers: VecDeque<PreviewDecision>,
    stop: Option<Arc<RunState>>,
    stop_after_confirm: Option<(Duration, Arc<RunState>)>,
}

impl ScriptedConfirmation {
    pub fn confirm() -> Self {
        Self {
            early: VecDeque::new(),
            answers: VecDeque::from([PreviewDecision::Confirm]),
            stop: None,
            stop_after_confirm: None,
        }
    }

    pub fn reject() -> Self {
        Self {
            answers: VecDeque::from([PreviewDecision::Reject]),
            ..Self::confirm()
        }
    }

    pub fn stop(state: Arc<RunState>) -> Self {
        Self {
            answers: VecDeque::new(),
            stop: Some(state),
            ..Self::confirm()
        }
    }

    /// Confirm, then stop `state` from another thread after `delay`.
    pub fn confirm_then_stop(delay: Duration, state: Arc<RunState>) -> Self {
        Self {
            stop_after_confirm: Some((delay, state)),
            ..Self::confirm()
        }
    }

    /// Queue `decision` as if its key was pressed during setup.
    pub fn pressed_early(mut self, decision: PreviewDecision) -> Self {
        self.early.push_back(decision);
        self
    }
}

impl PreviewConfirmation for ScriptedConfirmation {
    fn discard_pending(&mut self) {
        self.early.clear();
    }

    fn poll_decision(&mut self, timeout: Duration) -> Option<PreviewDecision> {
        if let Some(answer) = self.early.pop_front().or_else(|| self.answers.pop_front()) {
            if let (PreviewDecision::Confirm, Some((delay, state))) = (answer, self.stop_after_confirm.take()) {
                std::thread::spawn(move || {
                    std::thread::sleep(delay);
                    state.stop();
                });
            }
            return Some(answer);
        }
        if let Some(state) = &self.stop {
            state.stop();
        }
        std::thread::sleep(timeout);
        None
    }
}
