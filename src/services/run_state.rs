//! Shared run state: Running, Paused or Stopped.
//!
//! One atomic byte shared through an `Arc` between the control listener and
//! the execution thread. Stopped is terminal: once written, no transition
//! leaves it.

use std::sync::atomic::{AtomicU8, Ordering};
use std::thread;
use std::time::Duration;

const RUNNING: u8 = 0;
const PAUSED: u8 = 1;
const STOPPED: u8 = 2;

/// Snapshot of the shared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Running,
    Paused,
    Stopped,
}

#[derive(Debug)]
pub struct RunState {
    state: AtomicU8,
    poll_interval: Duration,
}

impl Default for RunState {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}

impl RunState {
    /// Start in Running; `poll_interval` paces [`wait_while_paused`](Self::wait_while_paused).
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            state: AtomicU8::new(RUNNING),
            poll_interval,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn phase(&self) -> RunPhase {
        match self.state.load(Ordering::Acquire) {
            RUNNING => RunPhase::Running,
            PAUSED => RunPhase::Paused,
            _ => RunPhase::Stopped,
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.phase() == RunPhase::Stopped
    }

    pub fn is_paused(&self) -> bool {
        self.phase() == RunPhase::Paused
    }

    pub fn is_running(&self) -> bool {
        self.phase() == RunPhase::Running
    }

    /// Move to Stopped. Idempotent.
    pub fn stop(&self) {
        let previous = self.state.swap(STOPPED, Ordering::AcqRel);
        if previous != STOPPED {
            tracing::info!("Stop requested");
        }
    }

    /// Flip Running and Paused. Has no effect once Stopped.
    ///
    /// Returns the phase after the call.
    pub fn toggle_pause(&self) -> RunPhase {
        let result = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |s| match s {
                RUNNING => Some(PAUSED),
                PAUSED => Some(RUNNING),
                _ => None,
            });
        match result {
            Ok(RUNNING) => {
                tracing::info!("Paused");
                RunPhase::Paused
            }
            Ok(_) => {
                tracing::info!("Resumed");
                RunPhase::Running
            }
            Err(_) => RunPhase::Stopped,
        }
    }

    /// Block while Paused, polling every interval.
    ///
    /// Returns `true` if the run may continue, `false` once Stopped.
    pub fn wait_while_paused(&self) -> bool {
        let mut announced = false;
        loop {
            match self.phase() {
                RunPhase::Running => return true,
                RunPhase::Stopped => return false,
                RunPhase::Paused => {
                    if !announced {
                        tracing::debug!("Waiting while paused");
                        announced = true;
                    }
                    thread::sleep(self.poll_interval);
                }
            }
        }
    }

    /// Sleep for `duration` in poll-interval slices, honouring pause and stop.
    ///
    /// Time spent paused does not count. Returns `false` if stopped.
    pub fn sleep(&self, duration: Duration) -> bool {
        let mut remaining = duration;
        while !remaining.is_zero() {
            if !self.wait_while_paused() {
                return false;
            }
            let slice = remaining.min(self.poll_interval);
            thread::sleep(slice);
            remaining -= slice;
        }
        !self.is_stopped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Instant;

    fn fast() -> RunState {
        RunState::new(Duration::from_millis(5))
    }

    #[test]
    fn test_initial_state_running() {
        let state = fast();
        assert_eq!(state.phase(), RunPhase::Running);
        assert!(state.wait_while_paused());
    }

    #[test]
    fn test_toggle_pause_round_trip() {
        let state = fast();
        assert_eq!(state.toggle_pause(), RunPhase::Paused);
        assert!(state.is_paused());
        assert_eq!(state.toggle_pause(), RunPhase::Running);
        assert!(state.is_running());
    }

    #[test]
    fn test_stopped_is_terminal() {
        let state = fast();
        state.toggle_pause();
        state.stop();
        for _ in 0..3 {
            assert_eq!(state.toggle_pause(), RunPhase::Stopped);
            assert!(state.is_stopped());
            assert!(!state.wait_while_paused());
        }
        state.stop();
        assert!(state.is_stopped());
    }

    #[test]
    fn test_wait_while_paused_observes_stop() {
        let state = Arc::new(fast());
        state.toggle_pause();
        let remote = state.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            remote.stop();
        });
        assert!(!state.wait_while_paused());
        handle.join().unwrap();
    }

    #[test]
    fn test_wait_while_paused_observes_resume() {
        let state = Arc::new(fast());
        state.toggle_pause();
        let remote = state.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            remote.toggle_pause();
        });
        assert!(state.wait_while_paused());
        handle.join().unwrap();
    }

    #[test]
    fn test_sleep_aborts_on_stop() {
        let state = Arc::new(fast());
        let remote = state.clone();
        let start = Instant::now();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            remote.stop();
        });
        assert!(!state.sleep(Duration::from_secs(10)));
        assert!(start.elapsed() < Duration::from_secs(5));
        handle.join().unwrap();
    }

    #[test]
    fn test_concurrent_toggles_never_leave_stopped() {
        let state = Arc::new(fast());
        state.stop();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let s = state.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        s.toggle_pause();
                        assert!(s.is_stopped());
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert!(state.is_stopped());
    }
}
