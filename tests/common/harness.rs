//! Controller wiring for integration tests.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use image::RgbImage;
use tempfile::TempDir;

use gridpaint::models::{DrawConfig, ScreenPoint};
use gridpaint::services::{Collaborators, ExecutionController, ListenerHandle, RunState};

use super::fakes::{FakeCapture, RecordingPointer, ScriptedConfirmation, ScriptedPicker};

/// One controller run against fake collaborators, with a scratch directory
/// for the input image and the preview.
pub struct TestRun {
    pub dir: TempDir,
    pub config: DrawConfig,
    pub state: Arc<RunState>,
    pub listener: ListenerHandle,
}

impl TestRun {
    /// Zero delays, no countdown and a fast pause poll.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = DrawConfig {
            click_delay: 0.0,
            color_change_delay: 0.0,
            clear_click_delay: 0.0,
            failsafe_delay: 0.0,
            countdown_secs: 0,
            pause_poll_ms: 5,
            seed: Some(7),
            preview_path: dir.path().join("preview.png"),
            debug_dir: dir.path().join("debug"),
            ..DrawConfig::default()
        };
        let state = Arc::new(RunState::new(config.pause_poll()));
        Self {
            dir,
            config,
            state,
            listener: ListenerHandle::default(),
        }
    }

    /// Run the pre-draw countdown for `secs` seconds.
    pub fn with_countdown(mut self, secs: u32) -> Self {
        self.config.countdown_secs = secs;
        self
    }

    pub fn write_image(&self, name: &str, img: &RgbImage) -> PathBuf {
        let path = self.dir.path().join(name);
        img.save(&path).expect("write input image");
        path
    }

    pub fn controller(
        &self,
        capture: FakeCapture,
        pointer: RecordingPointer,
        picker: ScriptedPicker,
        confirmation: ScriptedConfirmation,
    ) -> ExecutionController {
        let collaborators = Collaborators {
            capture: Box::new(capture),
            pointer: Box::new(pointer),
            picker: Box::new(picker),
            confirmation: Box::new(confirmation),
            listener: Some(self.listener.clone()),
        };
        ExecutionController::new(self.config.clone(), Arc::clone(&self.state), collaborators)
    }
}

pub fn recorded(clicks: &Arc<Mutex<Vec<ScreenPoint>>>) -> Vec<ScreenPoint> {
    clicks.lock().unwrap().clone()
}

pub fn near(p: ScreenPoint, x: i32, y: i32) -> bool {
    (p.x - x).abs() <= 2 && (p.y - y).abs() <= 2
}
