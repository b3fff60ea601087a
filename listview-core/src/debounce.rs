//! Quiet-window debouncing for rapid-fire input (range slider drags).
//!
//! Only the latest staged value survives; it is released once no new value
//! has been staged for the configured window. Time is passed in by the
//! caller so the debouncer stays deterministic under test.

use std::time::{Duration, Instant};

/// Default window for range slider commits.
pub const RANGE_DEBOUNCE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Stage a value, replacing any pending one and restarting the window.
    pub fn stage(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    /// Release the pending value if the window has elapsed since it was staged.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let ready = match &self.pending {
            Some((_, staged_at)) => now.saturating_duration_since(*staged_at) >= self.window,
            None => false,
        };
        if ready {
            self.pending.take().map(|(value, _)| value)
        } else {
            None
        }
    }

    /// Release the pending value immediately (drag end).
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(RANGE_DEBOUNCE)
    }
}
