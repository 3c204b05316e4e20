//! Encoder position tracking with idle auto-reset.
//!
//! The hardware counter counts half-quadrature pulses (two per detent);
//! this tracker divides down to detents, detects changes against the
//! last-notified position, and snaps a stale non-zero position back to
//! zero after [`SystemConfig::auto_reset_timeout_ms`] of inactivity.
//!
//! [`SystemConfig::auto_reset_timeout_ms`]: crate::config::SystemConfig::auto_reset_timeout_ms

/// Half-quadrature pulses per mechanical detent.
pub const PULSES_PER_DETENT: i32 = 2;

/// What changed during an [`update`](PositionTracker::update) call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionUpdate {
    /// The detent position differs from the last one handed out.
    Changed { position: i32 },
    /// The idle timeout fired; position is back at zero.  The caller
    /// must also clear the hardware counter.
    Reset,
}

pub struct PositionTracker {
    position: i32,
    last_notified: i32,
    last_activity_ms: u32,
    auto_reset_timeout_ms: u32,
}

impl PositionTracker {
    pub fn new(auto_reset_timeout_ms: u32, now_ms: u32) -> Self {
        Self {
            position: 0,
            last_notified: 0,
            last_activity_ms: now_ms,
            auto_reset_timeout_ms,
        }
    }

    /// Fold the current raw counter value in.  At most one update is
    /// returned per call; a position change always wins over the idle
    /// check because movement refreshes the activity timestamp.
    pub fn update(&mut self, raw_count: i32, now_ms: u32) -> Option<PositionUpdate> {
        let detents = raw_count / PULSES_PER_DETENT;
        if detents != self.position {
            self.position = detents;
            self.last_activity_ms = now_ms;
        }

        if self.position != self.last_notified {
            self.last_notified = self.position;
            return Some(PositionUpdate::Changed {
                position: self.position,
            });
        }

        if self.position != 0
            && now_ms.wrapping_sub(self.last_activity_ms) >= self.auto_reset_timeout_ms
        {
            self.position = 0;
            self.last_notified = 0;
            self.last_activity_ms = now_ms;
            return Some(PositionUpdate::Reset);
        }

        None
    }

    /// Current detent position.
    pub fn position(&self) -> i32 {
        self.position
    }

    /// Zero the position without emitting an update (connect-time reset).
    /// The caller must also clear the hardware counter.
    pub fn reset(&mut self, now_ms: u32) {
        self.position = 0;
        self.last_notified = 0;
        self.last_activity_ms = now_ms;
    }
}
