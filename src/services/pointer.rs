//! Pointer collaborator: moves the cursor and clicks.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rdev::{simulate, Button, EventType};

use crate::error::ClickError;
use crate::models::ScreenPoint;

/// Issues one left click at a screen point, then waits `delay_after`.
pub trait Pointer: Send {
    fn click(&mut self, at: ScreenPoint, delay_after: Duration) -> Result<(), ClickError>;
}

/// Last pointer position observed by the input listener.
#[derive(Debug, Default)]
pub struct PointerTracker {
    x: AtomicI32,
    y: AtomicI32,
    seen: AtomicBool,
}

impl PointerTracker {
    pub fn update(&self, x: f64, y: f64) {
        self.x.store(x.round() as i32, Ordering::Relaxed);
        self.y.store(y.round() as i32, Ordering::Relaxed);
        self.seen.store(true, Ordering::Release);
    }

    pub fn last(&self) -> Option<ScreenPoint> {
        if !self.seen.load(Ordering::Acquire) {
            return None;
        }
        Some(ScreenPoint::new(
            self.x.load(Ordering::Relaxed),
            self.y.load(Ordering::Relaxed),
        ))
    }

    /// The user parked the pointer at the screen origin.
    pub fn fail_safe_tripped(&self) -> bool {
        self.last() == Some(ScreenPoint::new(0, 0))
    }
}

/// Pointer that synthesizes OS input events through `rdev`.
pub struct RdevPointer {
    settle: Duration,
    tracker: Arc<PointerTracker>,
}

impl RdevPointer {
    /// `settle` is slept after every synthesized event.
    pub fn new(settle: Duration, tracker: Arc<PointerTracker>) -> Self {
        Self { settle, tracker }
    }

    fn send(&self, event: &EventType) -> Result<(), ClickError> {
        simulate(event).map_err(|_| ClickError::Backend(format!("could not send {:?}", event)))?;
        thread::sleep(self.settle);
        Ok(())
    }
}

impl Pointer for RdevPointer {
    fn click(&mut self, at: ScreenPoint, delay_after: Duration) -> Result<(), ClickError> {
        if self.tracker.fail_safe_tripped() {
            return Err(ClickError::FailSafe);
        }
        self.send(&EventType::MouseMove {
            x: at.x as f64,
            y: at.y as f64,
        })?;
        self.send(&EventType::ButtonPress(Button::Left))?;
        self.send(&EventType::ButtonRelease(Button::Left))?;
        tracing::trace!(x = at.x, y = at.y, "Clicked");
        thread::sleep(delay_after);
        Ok(())
    }
}
