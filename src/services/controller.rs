//! Execution controller: the run state machine.
//!
//! `Idle -> SettingUp -> Previewing -> [Clearing] -> Drawing -> Done`, with
//! `Cancelled` reachable from every non-terminal phase. Every click is
//! preceded by a pause/stop check on the shared [`RunState`]; a stop takes
//! effect at the next check, never in the middle of a click.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use swatch_match::{ColorMatcher, Rgb};

use crate::error::{CaptureError, ClickError, PickError};
use crate::models::{DrawConfig, DrawOp, Rect, ScreenPoint};

use super::canvas_detector::{CanvasGeometryDetector, CanvasLayout};
use super::capture::{Frame, ScreenCapture};
use super::debug_images::DebugImages;
use super::draw_order::optimize;
use super::image_planner::{ImagePlan, ImagePlanner};
use super::input_listener::{ListenerHandle, PreviewDecision};
use super::manual_pick::ManualPick;
use super::palette_detector::{EraserStrategy, PaletteGeometryDetector, PaletteLayout};
use super::pointer::Pointer;
use super::preview::{write_preview, PreviewConfirmation};
use super::run_state::RunState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    SettingUp,
    Previewing,
    Clearing,
    Drawing,
    Done,
    Cancelled,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Done | Phase::Cancelled)
    }
}

/// Why a run ended in `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// Stop requested through the control signal
    UserStop,
    PreviewRejected,
    PickCancelled,
    /// Nothing found on screen and no usable manual fallback
    DetectionFailed,
    Capture,
    Click,
    Image,
}

impl CancelReason {
    /// User-initiated cancellations are not errors.
    pub fn is_graceful(self) -> bool {
        matches!(
            self,
            CancelReason::UserStop | CancelReason::PreviewRejected | CancelReason::PickCancelled
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Cancelled { phase: Phase, reason: CancelReason },
}

impl RunOutcome {
    /// Completed, or cancelled by the user.
    pub fn is_success(&self) -> bool {
        match self {
            RunOutcome::Completed => true,
            RunOutcome::Cancelled { reason, .. } => reason.is_graceful(),
        }
    }
}

/// External collaborators driven by the controller.
pub struct Collaborators {
    pub capture: Box<dyn ScreenCapture>,
    pub pointer: Box<dyn Pointer>,
    pub picker: Box<dyn ManualPick>,
    pub confirmation: Box<dyn PreviewConfirmation>,
    /// Released when the run reaches a terminal phase
    pub listener: Option<ListenerHandle>,
}

/// Canvas and palette placement established during setup.
#[derive(Debug, Clone, PartialEq)]
pub struct Setup {
    pub canvas: CanvasLayout,
    pub palette: PaletteLayout,
}

pub struct ExecutionController {
    config: DrawConfig,
    seed: u64,
    state: Arc<RunState>,
    collab: Collaborators,
    canvas: CanvasGeometryDetector,
    palette: PaletteGeometryDetector,
    matcher: ColorMatcher,
    history: Vec<Phase>,
}

impl ExecutionController {
    pub fn new(config: DrawConfig, state: Arc<RunState>, collab: Collaborators) -> Self {
        let seed = config.seed.unwrap_or(0);
        let matcher = ColorMatcher::with_metric(config.match_metric.into());
        Self {
            canvas: CanvasGeometryDetector::new(&config),
            palette: PaletteGeometryDetector::new(&config),
            config,
            seed,
            state,
            collab,
            matcher,
            history: vec![Phase::Idle],
        }
    }

    pub fn with_debug(mut self, debug: DebugImages) -> Self {
        self.canvas = CanvasGeometryDetector::new(&self.config).with_debug(debug.clone());
        self.palette = PaletteGeometryDetector::new(&self.config).with_debug(debug);
        self
    }

    pub fn with_eraser_strategy(mut self, strategy: EraserStrategy) -> Self {
        self.palette = self.palette.with_eraser_strategy(strategy);
        self
    }

    pub fn phase(&self) -> Phase {
        self.history.last().copied().unwrap_or(Phase::Idle)
    }

    /// Every phase entered so far, starting with `Idle`.
    pub fn history(&self) -> &[Phase] {
        &self.history
    }

    /// Drive one run to a terminal phase.
    pub fn run(&mut self, input: &Path, clear: bool) -> RunOutcome {
        if self.phase() != Phase::Idle {
            tracing::warn!(phase = ?self.phase(), "Controller already used");
            return RunOutcome::Cancelled {
                phase: self.phase(),
                reason: CancelReason::UserStop,
            };
        }

        let outcome = match self.execute(input, clear) {
            Ok(()) => {
                self.enter(Phase::Done);
                tracing::info!("Drawing complete");
                RunOutcome::Completed
            }
            Err(reason) => {
                let phase = self.phase();
                self.enter(Phase::Cancelled);
                if reason.is_graceful() {
                    tracing::warn!(?phase, ?reason, "Run cancelled");
                } else {
                    tracing::error!(?phase, ?reason, "Run aborted");
                }
                RunOutcome::Cancelled { phase, reason }
            }
        };

        if let Some(listener) = &self.collab.listener {
            listener.release();
        }
        outcome
    }

    fn execute(&mut self, input: &Path, clear: bool) -> Result<(), CancelReason> {
        self.enter(Phase::SettingUp);
        let setup = self.set_up(clear)?;

        self.enter(Phase::Previewing);
        let plan = self.preview(input, &setup)?;
        self.countdown()?;

        if clear {
            self.enter(Phase::Clearing);
            self.clear(&setup)?;
        }

        self.enter(Phase::Drawing);
        self.draw(&setup, &plan)
    }

    fn enter(&mut self, phase: Phase) {
        tracing::debug!(from = ?self.phase(), to = ?phase, "Phase change");
        self.history.push(phase);
    }

    /// Pause/stop check before every suspension point.
    fn checkpoint(&self) -> Result<(), CancelReason> {
        if self.state.wait_while_paused() {
            Ok(())
        } else {
            Err(CancelReason::UserStop)
        }
    }

    fn capture(&self, region: Option<Rect>) -> Result<Frame, CancelReason> {
        self.collab.capture.capture(region).map_err(|e: CaptureError| {
            tracing::error!(%e, "Screen capture failed");
            CancelReason::Capture
        })
    }

    fn pick_failed(&self, e: PickError) -> CancelReason {
        match e {
            PickError::Cancelled if self.state.is_stopped() => CancelReason::UserStop,
            PickError::Cancelled => CancelReason::PickCancelled,
            PickError::InvalidRect => {
                tracing::error!(%e, "Manual pick rejected");
                CancelReason::DetectionFailed
            }
        }
    }

    fn set_up(&mut self, clear: bool) -> Result<Setup, CancelReason> {
        self.checkpoint()?;
        let screen = self.capture(None)?;

        let canvas = match self.canvas.detect(&screen) {
            Some(layout) => layout,
            None => {
                tracing::warn!("Canvas not found automatically, falling back to manual selection");
                let rect = self
                    .collab
                    .picker
                    .get_rect("canvas")
                    .map_err(|e| self.pick_failed(e))?;
                let region = self.capture(Some(rect))?;
                self.canvas.set_manual(rect, Some(&region))
            }
        };
        tracing::info!(rect = %canvas.rect, grid = %canvas.grid, "Canvas ready");

        let mut palette = match self.palette.detect(&screen) {
            Some(layout) => layout,
            None => {
                tracing::warn!("Palette not found automatically, falling back to manual selection");
                let rect = self
                    .collab
                    .picker
                    .get_rect("palette")
                    .map_err(|e| self.pick_failed(e))?;
                self.palette.set_manual(rect, Vec::new())
            }
        };
        if clear && palette.eraser.is_none() {
            let eraser = self
                .collab
                .picker
                .get_point("Click the ERASER in the palette")
                .map_err(|e| self.pick_failed(e))?;
            palette = palette.with_eraser(Some(eraser));
        }
        tracing::info!(rect = %palette.rect, swatches = palette.swatches.len(), "Palette ready");

        Ok(Setup { canvas, palette })
    }

    fn preview(&mut self, input: &Path, setup: &Setup) -> Result<ImagePlan, CancelReason> {
        let plan = ImagePlanner::new(&self.config, self.seed)
            .plan_file(input, setup.canvas.grid)
            .map_err(|e| {
                tracing::error!(%e, path = %input.display(), "Cannot prepare image");
                CancelReason::Image
            })?;
        write_preview(&plan, self.config.preview_scale, &self.config.preview_path).map_err(|e| {
            tracing::error!(%e, "Cannot write preview");
            CancelReason::Image
        })?;

        self.collab.confirmation.discard_pending();
        tracing::info!(
            path = %self.config.preview_path.display(),
            "Check the preview, then press Enter to start or Backspace to cancel"
        );
        loop {
            self.checkpoint()?;
            match self.collab.confirmation.poll_decision(self.state.poll_interval()) {
                Some(PreviewDecision::Confirm) => {
                    tracing::info!("Preview confirmed");
                    return Ok(plan);
                }
                Some(PreviewDecision::Reject) => {
                    tracing::info!("Preview rejected");
                    return Err(CancelReason::PreviewRejected);
                }
                None => {}
            }
        }
    }

    fn countdown(&self) -> Result<(), CancelReason> {
        tracing::info!("Switch to the drawing window. Space pauses, Esc cancels");
        for remaining in (1..=self.config.countdown_secs).rev() {
            tracing::info!(remaining, "Starting in");
            if !self.state.sleep(Duration::from_secs(1)) {
                return Err(CancelReason::UserStop);
            }
        }
        Ok(())
    }

    fn click(&mut self, at: ScreenPoint, delay: Duration) -> Result<(), CancelReason> {
        self.collab.pointer.click(at, delay).map_err(|e: ClickError| {
            tracing::error!(%e, x = at.x, y = at.y, "Click failed");
            CancelReason::Click
        })
    }

    fn clear(&mut self, setup: &Setup) -> Result<(), CancelReason> {
        let eraser = setup.palette.eraser.ok_or_else(|| {
            tracing::error!("No eraser position for clearing");
            CancelReason::DetectionFailed
        })?;
        let canvas = &setup.canvas;
        tracing::info!(grid = %canvas.grid, "Clearing canvas");

        let select_delay = self.config.color_change_delay();
        self.checkpoint()?;
        self.click(eraser, select_delay)?;

        let total = canvas.grid.cell_count();
        let delay = self.config.clear_click_delay();
        for (done, center) in canvas.cell_centers().enumerate() {
            self.checkpoint()?;
            self.click(center, delay)?;
            log_progress("Clearing", done + 1, total);
        }
        tracing::info!("Canvas cleared");
        Ok(())
    }

    fn draw(&mut self, setup: &Setup, plan: &ImagePlan) -> Result<(), CancelReason> {
        self.checkpoint()?;
        let frame = self
            .palette
            .capture(self.collab.capture.as_ref(), &setup.palette)
            .map_err(|e| {
                tracing::error!(%e, "Palette capture failed");
                CancelReason::Capture
            })?;
        let palette_colors =
            self.palette
                .extract_colors(&setup.palette, &frame, self.config.num_colors, self.seed);
        if palette_colors.is_empty() {
            tracing::error!("No palette colors available");
            return Err(CancelReason::DetectionFailed);
        }

        let assignment = self.matcher.map(plan.colors(), &palette_colors);
        for (color, point) in &assignment {
            tracing::debug!(%color, x = point.x, y = point.y, "Color assigned");
        }

        let ops = draw_ops(&setup.canvas, plan, &assignment);
        tracing::info!(ops = ops.len(), cells = plan.cells.len(), "Drawing");
        if ops.is_empty() {
            tracing::error!("Nothing to draw");
            return Err(CancelReason::DetectionFailed);
        }

        let total = ops.len();
        let (select_delay, draw_delay) = (self.config.color_change_delay(), self.config.click_delay());
        for (done, op) in ops.iter().enumerate() {
            self.checkpoint()?;
            self.click(op.swatch, select_delay)?;
            self.click(op.target, draw_delay)?;
            log_progress("Drawing", done + 1, total);
        }
        Ok(())
    }
}

/// Ordered draw operations for every cell whose color has a swatch.
pub fn draw_ops(
    canvas: &CanvasLayout,
    plan: &ImagePlan,
    assignment: &HashMap<Rgb, ScreenPoint>,
) -> Vec<DrawOp> {
    let ordered = optimize(&plan.cells);
    let mut skipped = 0usize;
    let ops: Vec<DrawOp> = ordered
        .iter()
        .filter_map(|cell| match assignment.get(&cell.color) {
            Some(&swatch) => Some(DrawOp {
                target: canvas.grid.cell_center(&canvas.rect, cell.col, cell.row),
                swatch,
                color: cell.color,
            }),
            None => {
                skipped += 1;
                None
            }
        })
        .collect();
    if skipped > 0 {
        tracing::warn!(skipped, "Cells without a palette color were skipped");
    }
    ops
}

fn log_progress(what: &str, done: usize, total: usize) {
    let step = (total / 10).max(1);
    if done % step == 0 || done == total {
        tracing::info!(done, total, "{} progress", what);
    }
}
