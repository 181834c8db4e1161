//! Restartable debounce timers
//!
//! Cooperative: arming records a deadline, the host's event loop calls
//! back via `SyncEngine::pump` and due timers fire there. Re-arming
//! supersedes a pending deadline.

use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct DebounceTimer {
    deadline: Option<Instant>,
}

impl DebounceTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)start the timer; any earlier pending firing is superseded
    pub fn start(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    pub fn stop(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Disarm and report true if the deadline has passed
    pub fn take_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
