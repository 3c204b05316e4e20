//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started {
                cause,
                resumed_link,
            } => {
                info!("START | cause={:?} link_before_sleep={}", cause, resumed_link);
            }
            AppEvent::Gesture(ev) => {
                info!("GESTURE | {} {:?}", ev.button.name(), ev.gesture);
            }
            AppEvent::PositionChanged {
                position,
                battery_percent,
            } => {
                info!("POSITION | {} (battery {}%)", position, battery_percent);
            }
            AppEvent::PositionReset => {
                info!("POSITION | idle reset to 0");
            }
            AppEvent::ClientConnected => {
                info!("LINK | central connected");
            }
            AppEvent::ClientDisconnected => {
                info!("LINK | central disconnected");
            }
            AppEvent::AdvertisingStarted => {
                info!("LINK | advertising re-armed");
            }
            AppEvent::BatteryLow { percent } => {
                info!("BATTERY | low ({}%)", percent);
            }
            AppEvent::SleepPending { link_was_up } => {
                info!("SLEEP | lid closed (link_was_up={})", link_was_up);
            }
        }
    }
}
