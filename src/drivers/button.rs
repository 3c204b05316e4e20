//! Polled button driver with click counting and long-press detection.
//!
//! ## Hardware
//!
//! Active-low momentary switch with a pull-up.  The main loop samples the
//! level every iteration and feeds it to `tick()`, which runs the debounce
//! and gesture state machine.  No interrupts — at a 5 ms poll the switch is
//! oversampled well past any mechanical bounce.
//!
//! ## Gesture detection
//!
//! | Gesture            | Condition                                         |
//! |--------------------|---------------------------------------------------|
//! | Single click       | One press/release, window closes with count 1     |
//! | Double click       | Two presses inside the click window               |
//! | Multi click        | Three or more presses inside the window           |
//! | Long press release | Hold past the threshold, emitted on release       |
//!
//! A long press discards the click count accumulated in the same press
//! cycle.  At most one gesture is emitted per tick.

use crate::app::events::{ButtonId, Gesture};

/// Debounce and classification windows, sourced from
/// [`SystemConfig`](crate::config::SystemConfig) in production.
#[derive(Debug, Clone, Copy)]
pub struct GestureTiming {
    pub debounce_ms: u32,
    pub multi_click_window_ms: u32,
    pub long_press_ms: u32,
}

impl Default for GestureTiming {
    fn default() -> Self {
        Self {
            debounce_ms: 30,
            multi_click_window_ms: 400,
            long_press_ms: 1000,
        }
    }
}

/// Internal level state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PressState {
    Released,
    /// Press edge seen, waiting for the level to hold.
    PressWait { since_ms: u32 },
    /// Confirmed down; `since_ms` anchors the long-press clock.
    Pressed { since_ms: u32 },
    /// Release edge seen, waiting for the level to hold.
    ReleaseWait { since_ms: u32, pressed_since_ms: u32 },
}

pub struct ButtonDriver {
    id: ButtonId,
    gpio: i32,
    timing: GestureTiming,
    state: PressState,
    /// Confirmed releases inside the current click window.
    clicks: u8,
    last_release_ms: u32,
    /// Hold crossed the long-press threshold in this press cycle.
    long_press: bool,
}

impl ButtonDriver {
    pub fn new(id: ButtonId, gpio: i32, timing: GestureTiming) -> Self {
        Self {
            id,
            gpio,
            timing,
            state: PressState::Released,
            clicks: 0,
            last_release_ms: 0,
            long_press: false,
        }
    }

    pub fn id(&self) -> ButtonId {
        self.id
    }

    /// GPIO pin this button is attached to.
    pub fn gpio(&self) -> i32 {
        self.gpio
    }

    /// Call from the main loop each iteration with the sampled level.
    /// `pressed` is the debounce-raw state (active-low already decoded).
    /// Returns a classified gesture when a timing window closes.
    pub fn tick(&mut self, now_ms: u32, pressed: bool) -> Option<Gesture> {
        match self.state {
            PressState::Released => {
                if pressed {
                    self.state = PressState::PressWait { since_ms: now_ms };
                    return None;
                }
                if self.clicks > 0
                    && now_ms.wrapping_sub(self.last_release_ms)
                        >= self.timing.multi_click_window_ms
                {
                    let count = self.clicks;
                    self.clicks = 0;
                    return Some(match count {
                        1 => Gesture::SingleClick,
                        2 => Gesture::DoubleClick,
                        n => Gesture::MultiClick(n),
                    });
                }
                None
            }

            PressState::PressWait { since_ms } => {
                if !pressed {
                    // Noise — the level did not hold.
                    self.state = PressState::Released;
                } else if now_ms.wrapping_sub(since_ms) >= self.timing.debounce_ms {
                    self.state = PressState::Pressed { since_ms: now_ms };
                    self.long_press = false;
                }
                None
            }

            PressState::Pressed { since_ms } => {
                if now_ms.wrapping_sub(since_ms) >= self.timing.long_press_ms {
                    self.long_press = true;
                }
                if !pressed {
                    self.state = PressState::ReleaseWait {
                        since_ms: now_ms,
                        pressed_since_ms: since_ms,
                    };
                }
                None
            }

            PressState::ReleaseWait {
                since_ms,
                pressed_since_ms,
            } => {
                if pressed {
                    // Release bounce — the hold clock keeps its anchor.
                    self.state = PressState::Pressed {
                        since_ms: pressed_since_ms,
                    };
                    return None;
                }
                if now_ms.wrapping_sub(since_ms) >= self.timing.debounce_ms {
                    self.state = PressState::Released;
                    if self.long_press {
                        self.long_press = false;
                        self.clicks = 0;
                        return Some(Gesture::LongPressRelease);
                    }
                    self.clicks = self.clicks.saturating_add(1);
                    self.last_release_ms = now_ms;
                }
                None
            }
        }
    }
}
