//! Auto-dismiss timer for the notification alert panel.

use crate::config::ALERT_DURATION_MS;

/// Ephemeral record controlling when the alert overlay hides itself.
///
/// While `active`, the panel must be hidden at `started_at_ms + duration_ms`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlertTimer {
    started_at_ms: u64,
    duration_ms: u64,
    active: bool,
}

impl AlertTimer {
    pub const fn new() -> Self {
        Self::with_duration(ALERT_DURATION_MS)
    }

    pub const fn with_duration(duration_ms: u64) -> Self {
        Self {
            started_at_ms: 0,
            duration_ms,
            active: false,
        }
    }

    /// Arm (or re-arm) the timer at `now_ms`.
    pub fn start(&mut self, now_ms: u64) {
        self.started_at_ms = now_ms;
        self.active = true;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Uptime at which the panel hides, while armed.
    pub fn deadline(&self) -> Option<u64> {
        self.active
            .then(|| self.started_at_ms.saturating_add(self.duration_ms))
    }

    /// Check the timer once per frame.
    ///
    /// Returns `true` exactly once, on the first poll at or after the
    /// deadline; the timer is disarmed at that point.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.deadline() {
            Some(deadline) if now_ms >= deadline => {
                self.active = false;
                true
            }
            _ => false,
        }
    }
}

impl Default for AlertTimer {
    fn default() -> Self {
        Self::new()
    }
}
