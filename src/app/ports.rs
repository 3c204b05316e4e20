//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Dispatcher (domain) ──▶ NotifyPort ──▶ BLE adapter
//!   Main loop  (domain) ──▶ EventSink  ──▶ log adapter
//! ```
//!
//! Driven adapters implement these traits.  The domain core consumes them
//! via generics, so tracker/dispatcher/supervisor logic never touches the
//! Bluedroid stack directly and runs unmodified in host tests.

use core::fmt;

use super::dispatcher::ChannelId;

// ───────────────────────────────────────────────────────────────
// Notify port (driven adapter: domain → BLE characteristic)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the dispatcher calls this to push a characteristic
/// notification to the connected central.
pub trait NotifyPort {
    /// Send `payload` as a notification on `channel`.
    ///
    /// Implementations report transport-level failures through
    /// [`NotifyError`]; callers log and drop — a failed notification
    /// must never take down the polling loop.
    fn notify(&mut self, channel: ChannelId, payload: &str) -> Result<(), NotifyError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The main loop emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`NotifyPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyError {
    /// No central is connected.
    NotConnected,
    /// The characteristic has not finished registering.
    ChannelNotReady,
    /// The BLE stack rejected the send (carries the IDF return code).
    Transport(i32),
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "no central connected"),
            Self::ChannelNotReady => write!(f, "characteristic not registered"),
            Self::Transport(rc) => write!(f, "stack send failed (rc={rc})"),
        }
    }
}
