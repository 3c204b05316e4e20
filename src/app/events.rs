//! Semantic input events and outbound application events.
//!
//! [`Gesture`] is what the button debouncer produces once a timing window
//! closes; [`GestureEvent`] pairs it with the source button.  [`AppEvent`]s
//! are the structured outbound events the main loop emits through the
//! [`EventSink`](super::ports::EventSink) port — adapters on the other side
//! decide what to do with them (log to serial, mirror to telemetry, etc.).

use crate::power::WakeCause;

/// Identity of a physical button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonId {
    /// The encoder push switch.
    Encoder,
    Master,
    Gaming,
    Aux,
    Media,
    Chat,
}

impl ButtonId {
    /// Name carried in media-channel notification payloads.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Encoder => "Encoder",
            Self::Master => "Master",
            Self::Gaming => "Gaming",
            Self::Aux => "Aux",
            Self::Media => "Media",
            Self::Chat => "Chat",
        }
    }
}

/// Classified button gesture, emitted when its timing window closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    SingleClick,
    DoubleClick,
    /// Three or more clicks inside the window; carries the count.
    MultiClick(u8),
    /// A hold past the long-press threshold ended.  Suppresses the
    /// click count accumulated in the same press cycle.
    LongPressRelease,
}

/// A gesture together with the button that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureEvent {
    pub button: ButtonId,
    pub gesture: Gesture,
}

/// Structured events emitted by the main loop.
#[derive(Debug, Clone, Copy)]
pub enum AppEvent {
    /// Firmware came up (carries the wake cause and whether a client
    /// was connected before the preceding deep sleep).
    Started { cause: WakeCause, resumed_link: bool },

    /// A button gesture was classified.
    Gesture(GestureEvent),

    /// The encoder moved to a new detent position.
    PositionChanged { position: i32, battery_percent: u8 },

    /// The idle timeout snapped the position back to zero.
    PositionReset,

    /// A BLE central connected.
    ClientConnected,

    /// The BLE central disconnected.
    ClientDisconnected,

    /// Advertising was re-armed after the disconnect settle delay.
    AdvertisingStarted,

    /// Battery percentage crossed below the advisory threshold.
    BatteryLow { percent: u8 },

    /// The reed switch closed; deep sleep entry is imminent.
    SleepPending { link_was_up: bool },
}
