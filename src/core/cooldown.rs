//! Cooldown gate: "has enough time passed since the last fire"
//!
//! Callers pass `now` explicitly so the gate can be driven by a fake clock.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Cooldown {
    window: Duration,
    last_fire: Option<Instant>,
}

impl Cooldown {
    /// A gate that has never fired is open
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_fire: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn last_fire(&self) -> Option<Instant> {
        self.last_fire
    }

    /// Open iff at least `window` has elapsed since the last fire
    pub fn is_ready(&self, now: Instant) -> bool {
        match self.last_fire {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.window,
        }
    }

    /// Check and fire in one step; returns whether it fired
    pub fn try_fire(&mut self, now: Instant) -> bool {
        if self.is_ready(now) {
            self.last_fire = Some(now);
            true
        } else {
            false
        }
    }

    /// Restart the window unconditionally
    pub fn mark(&mut self, now: Instant) {
        self.last_fire = Some(now);
    }

    /// Time left until the gate opens
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last_fire {
            None => Duration::ZERO,
            Some(last) => self.window.saturating_sub(now.saturating_duration_since(last)),
        }
    }
}
