//! Global keyboard and mouse listener.
//!
//! Esc stops the run, Space toggles pause, Enter and Backspace answer the
//! preview prompt. Left clicks feed the manual picker and pointer motion
//! feeds the fail-safe tracker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::Arc;
use std::thread;

use rdev::{listen, Button, Event, EventType, Key};

use crate::models::ScreenPoint;

use super::pointer::PointerTracker;
use super::run_state::{RunPhase, RunState};

/// User answer to the preview prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewDecision {
    Confirm,
    Reject,
}

/// Detaches the listener once the run is over.
///
/// The OS hook cannot be torn down from outside its thread, so a released
/// handle turns the callback into a no-op instead.
#[derive(Debug, Clone, Default)]
pub struct ListenerHandle {
    detached: Arc<AtomicBool>,
}

impl ListenerHandle {
    pub fn release(&self) {
        if !self.detached.swap(true, Ordering::AcqRel) {
            tracing::debug!("Control listener released");
        }
    }

    pub fn is_released(&self) -> bool {
        self.detached.load(Ordering::Acquire)
    }
}

/// Routes raw input events to the run state and the channels.
pub struct ControlRouter {
    state: Arc<RunState>,
    tracker: Arc<PointerTracker>,
    picks: SyncSender<ScreenPoint>,
    decisions: SyncSender<PreviewDecision>,
    handle: ListenerHandle,
}

impl ControlRouter {
    pub fn handle(&mut self, event: &EventType) {
        if self.handle.is_released() {
            return;
        }
        match *event {
            EventType::KeyPress(Key::Escape) => {
                tracing::info!("Esc pressed, stopping");
                self.state.stop();
            }
            EventType::KeyPress(Key::Space) => match self.state.toggle_pause() {
                RunPhase::Paused => tracing::info!("Paused (Space to resume)"),
                RunPhase::Running => tracing::info!("Resumed"),
                RunPhase::Stopped => {}
            },
            EventType::KeyPress(Key::Return) => {
                let _ = self.decisions.try_send(PreviewDecision::Confirm);
            }
            EventType::KeyPress(Key::Backspace) => {
                let _ = self.decisions.try_send(PreviewDecision::Reject);
            }
            EventType::MouseMove { x, y } => self.tracker.update(x, y),
            EventType::ButtonPress(Button::Left) => {
                if let Some(point) = self.tracker.last() {
                    let _ = self.picks.try_send(point);
                }
            }
            _ => {}
        }
    }
}

/// Channels fed by the listener.
pub struct ListenerChannels {
    pub handle: ListenerHandle,
    pub picks: Receiver<ScreenPoint>,
    pub decisions: Receiver<PreviewDecision>,
}

/// Build a router plus the receiving ends, without touching the OS.
pub fn control_router(state: Arc<RunState>, tracker: Arc<PointerTracker>) -> (ControlRouter, ListenerChannels) {
    let (pick_tx, pick_rx) = sync_channel(16);
    let (decision_tx, decision_rx) = sync_channel(1);
    let handle = ListenerHandle::default();
    let router = ControlRouter {
        state,
        tracker,
        picks: pick_tx,
        decisions: decision_tx,
        handle: handle.clone(),
    };
    let channels = ListenerChannels {
        handle,
        picks: pick_rx,
        decisions: decision_rx,
    };
    (router, channels)
}

/// Start the OS-level listener on a background thread.
pub fn spawn_listener(state: Arc<RunState>, tracker: Arc<PointerTracker>) -> ListenerChannels {
    let (mut router, channels) = control_router(Arc::clone(&state), tracker);
    thread::spawn(move || {
        let result = listen(move |event: Event| router.handle(&event.event_type));
        if let Err(e) = result {
            tracing::error!("Input listener failed: {:?}; stopping run", e);
            state.stop();
        }
    });
    channels
}
