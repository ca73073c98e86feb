//! Turn countdown. Pure tick logic; the node drives it from a one-second
//! interval and feeds [`TimerEvent::Expired`] into the state machine.

use crate::config::TURN_SECONDS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// One second elapsed; seconds remaining.
    Tick(u32),
    /// Countdown reached zero. The timer re-loads and stops until re-armed.
    Expired,
}

/// Countdown running only while the local peer holds the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnTimer {
    remaining: u32,
    running: bool,
}

impl TurnTimer {
    pub fn new() -> Self {
        Self {
            remaining: TURN_SECONDS,
            running: false,
        }
    }

    /// Reset to the full countdown and start running.
    pub fn arm(&mut self) {
        self.remaining = TURN_SECONDS;
        self.running = true;
    }

    /// Stop without firing. Remaining time re-loads on the next arm.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Advance one second. Returns `None` while stopped.
    pub fn tick(&mut self) -> Option<TimerEvent> {
        if !self.running {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running = false;
            self.remaining = TURN_SECONDS;
            Some(TimerEvent::Expired)
        } else {
            Some(TimerEvent::Tick(self.remaining))
        }
    }
}

impl Default for TurnTimer {
    fn default() -> Self {
        Self::new()
    }
}
