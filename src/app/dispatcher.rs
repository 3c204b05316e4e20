//! Notification dispatcher — maps semantic events onto GATT channels.
//!
//! Two channel behaviours:
//!
//! | Kind  | Behaviour                                                |
//! |-------|----------------------------------------------------------|
//! | Level | Payload replaces the previous value, nothing follows.    |
//! | Pulse | Payload is followed by a `"0"` clear one pulse delay     |
//! |       | later, so the client sees a discrete event, not a state. |
//!
//! Clears are deferred, not slept: a pulse send arms a deadline and
//! [`flush_pending`](NotificationDispatcher::flush_pending) fires the
//! clear from the main loop once the delay has elapsed.  Every send is
//! gated on connection state — disconnected sends are dropped silently
//! (a guard, not an error), and pending clears die with the connection.

use core::fmt::Write;

use log::{debug, warn};

use super::events::{ButtonId, Gesture, GestureEvent};
use super::ports::NotifyPort;

/// Longest payload: `"long press release"` (18) or `"<i32> <pct>"` (15).
pub const MAX_PAYLOAD_BYTES: usize = 24;

/// Fixed-capacity notification payload.
pub type Payload = heapless::String<MAX_PAYLOAD_BYTES>;

/// Payload sent to return a pulse channel to its resting state.
const CLEAR_PAYLOAD: &str = "0";

/// Named notification channels, one per GATT characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelId {
    /// Detent position + battery, level semantics.
    EncoderPosition,
    /// Encoder switch gestures, pulse semantics.
    EncoderGesture,
    /// Media button single clicks, pulse semantics.
    MediaSingle,
    /// Media button double clicks, pulse semantics.
    MediaDouble,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Level,
    Pulse,
}

impl ChannelId {
    pub const fn kind(self) -> ChannelKind {
        match self {
            Self::EncoderPosition => ChannelKind::Level,
            Self::EncoderGesture | Self::MediaSingle | Self::MediaDouble => ChannelKind::Pulse,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::EncoderPosition => "encoder-position",
            Self::EncoderGesture => "encoder-gesture",
            Self::MediaSingle => "media-single",
            Self::MediaDouble => "media-double",
        }
    }
}

/// A `"0"` clear waiting for its deadline.
#[derive(Debug, Clone, Copy)]
struct PendingClear {
    channel: ChannelId,
    armed_ms: u32,
}

pub struct NotificationDispatcher {
    pulse_clear_delay_ms: u32,
    pending: heapless::Vec<PendingClear, 4>,
}

impl NotificationDispatcher {
    pub fn new(pulse_clear_delay_ms: u32) -> Self {
        Self {
            pulse_clear_delay_ms,
            pending: heapless::Vec::new(),
        }
    }

    // ── Sending ───────────────────────────────────────────────

    /// Send on a level channel.  Dropped silently when disconnected.
    pub fn send_level(
        &mut self,
        port: &mut impl NotifyPort,
        connected: bool,
        channel: ChannelId,
        payload: &str,
    ) {
        if !connected {
            debug!("notify: {} '{}' dropped (no client)", channel.label(), payload);
            return;
        }
        if let Err(e) = port.notify(channel, payload) {
            warn!("notify: {} '{}' failed — {}", channel.label(), payload, e);
        }
    }

    /// Send on a pulse channel and arm its deferred `"0"` clear.
    /// A second pulse on the same channel before the clear fires
    /// re-arms the deadline instead of stacking a duplicate clear.
    pub fn send_pulse(
        &mut self,
        port: &mut impl NotifyPort,
        connected: bool,
        now_ms: u32,
        channel: ChannelId,
        payload: &str,
    ) {
        if !connected {
            debug!("notify: {} '{}' dropped (no client)", channel.label(), payload);
            return;
        }
        if let Err(e) = port.notify(channel, payload) {
            warn!("notify: {} '{}' failed — {}", channel.label(), payload, e);
            return;
        }
        self.pending.retain(|p| p.channel != channel);
        if self
            .pending
            .push(PendingClear {
                channel,
                armed_ms: now_ms,
            })
            .is_err()
        {
            warn!("notify: clear queue full, {} left latched", channel.label());
        }
    }

    /// Fire every clear whose delay has elapsed.  Call once per loop
    /// iteration.  Clears that come due while disconnected are dropped.
    pub fn flush_pending(
        &mut self,
        port: &mut impl NotifyPort,
        connected: bool,
        now_ms: u32,
    ) {
        let mut i = 0;
        while i < self.pending.len() {
            if now_ms.wrapping_sub(self.pending[i].armed_ms) >= self.pulse_clear_delay_ms {
                let due = self.pending.swap_remove(i);
                if connected {
                    if let Err(e) = port.notify(due.channel, CLEAR_PAYLOAD) {
                        warn!("notify: {} clear failed — {}", due.channel.label(), e);
                    }
                }
            } else {
                i += 1;
            }
        }
    }

    /// Abandon all armed clears (disconnect or sleep entry).
    pub fn drop_pending(&mut self) {
        self.pending.clear();
    }

    /// Number of clears currently armed.
    pub fn pending_clears(&self) -> usize {
        self.pending.len()
    }

    // ── Gesture routing ───────────────────────────────────────

    /// Route a classified gesture to its channel.
    ///
    /// The encoder switch owns a dedicated gesture channel; media buttons
    /// report single and double clicks on the two shared media channels
    /// with the button name as payload.  Media gestures with no channel
    /// (triple-plus clicks, long presses) are dropped with a debug log.
    pub fn dispatch_gesture(
        &mut self,
        port: &mut impl NotifyPort,
        connected: bool,
        now_ms: u32,
        event: &GestureEvent,
    ) {
        match event.button {
            ButtonId::Encoder => {
                self.send_pulse(
                    port,
                    connected,
                    now_ms,
                    ChannelId::EncoderGesture,
                    gesture_label(event.gesture),
                );
            }
            button => match event.gesture {
                Gesture::SingleClick => {
                    self.send_pulse(port, connected, now_ms, ChannelId::MediaSingle, button.name());
                }
                Gesture::DoubleClick => {
                    self.send_pulse(port, connected, now_ms, ChannelId::MediaDouble, button.name());
                }
                other => {
                    debug!("notify: {:?} on {} has no channel", other, button.name());
                }
            },
        }
    }
}

// ── Payload formatting ────────────────────────────────────────

/// Wire label for an encoder-switch gesture.
pub fn gesture_label(gesture: Gesture) -> &'static str {
    match gesture {
        Gesture::SingleClick => "single click",
        Gesture::DoubleClick => "double click",
        Gesture::MultiClick(_) => "multi click",
        Gesture::LongPressRelease => "long press release",
    }
}

/// `"<position> <battery>"`, e.g. `"3 87"`.
pub fn position_payload(position: i32, battery_percent: u8) -> Payload {
    let mut s = Payload::new();
    let _ = write!(s, "{} {}", position, battery_percent);
    s
}

/// `"reset <battery>"` — the client treats a leading `reset` token as a
/// zeroing marker and still gets a battery reading out of the second field.
pub fn reset_payload(battery_percent: u8) -> Payload {
    let mut s = Payload::new();
    let _ = write!(s, "reset {}", battery_percent);
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::NotifyError;

    const PULSE_DELAY: u32 = 100;

    struct RecordingPort {
        sent: Vec<(ChannelId, String)>,
        fail_next: bool,
    }

    impl RecordingPort {
        fn new() -> Self {
            Self {
                sent: Vec::new(),
                fail_next: false,
            }
        }
    }

    impl NotifyPort for RecordingPort {
        fn notify(&mut self, channel: ChannelId, payload: &str) -> Result<(), NotifyError> {
            if self.fail_next {
                self.fail_next = false;
                return Err(NotifyError::Transport(-1));
            }
            self.sent.push((channel, payload.to_string()));
            Ok(())
        }
    }

    fn make() -> (NotificationDispatcher, RecordingPort) {
        (NotificationDispatcher::new(PULSE_DELAY), RecordingPort::new())
    }

    #[test]
    fn disconnected_sends_are_dropped() {
        let (mut d, mut port) = make();
        d.send_level(&mut port, false, ChannelId::EncoderPosition, "1 50");
        d.send_pulse(&mut port, false, 0, ChannelId::EncoderGesture, "single click");
        assert!(port.sent.is_empty());
        assert_eq!(d.pending_clears(), 0);
    }

    #[test]
    fn pulse_pairs_value_then_clear_after_delay() {
        let (mut d, mut port) = make();
        d.send_pulse(&mut port, true, 0, ChannelId::EncoderGesture, "double click");
        assert_eq!(port.sent.len(), 1);

        d.flush_pending(&mut port, true, PULSE_DELAY - 1);
        assert_eq!(port.sent.len(), 1, "clear must not fire early");

        d.flush_pending(&mut port, true, PULSE_DELAY);
        assert_eq!(port.sent.len(), 2);
        assert_eq!(port.sent[1], (ChannelId::EncoderGesture, "0".to_string()));
        assert_eq!(d.pending_clears(), 0);
    }

    #[test]
    fn level_sends_never_arm_clears() {
        let (mut d, mut port) = make();
        d.send_level(&mut port, true, ChannelId::EncoderPosition, "4 91");
        d.flush_pending(&mut port, true, PULSE_DELAY * 2);
        assert_eq!(port.sent.len(), 1);
        assert_eq!(d.pending_clears(), 0);
    }

    #[test]
    fn repeat_pulse_rearms_instead_of_stacking() {
        let (mut d, mut port) = make();
        d.send_pulse(&mut port, true, 0, ChannelId::MediaSingle, "Master");
        d.send_pulse(&mut port, true, 50, ChannelId::MediaSingle, "Gaming");
        assert_eq!(d.pending_clears(), 1);

        // Original deadline (100) passed, re-armed one (150) not yet.
        d.flush_pending(&mut port, true, 120);
        assert_eq!(port.sent.len(), 2);

        d.flush_pending(&mut port, true, 150);
        assert_eq!(port.sent.len(), 3);
        assert_eq!(port.sent[2].1, "0");
    }

    #[test]
    fn clears_die_with_the_connection() {
        let (mut d, mut port) = make();
        d.send_pulse(&mut port, true, 0, ChannelId::EncoderGesture, "single click");
        d.drop_pending();
        d.flush_pending(&mut port, true, PULSE_DELAY * 2);
        assert_eq!(port.sent.len(), 1, "no clear after drop_pending");
    }

    #[test]
    fn due_clear_while_disconnected_is_discarded() {
        let (mut d, mut port) = make();
        d.send_pulse(&mut port, true, 0, ChannelId::MediaDouble, "Chat");
        d.flush_pending(&mut port, false, PULSE_DELAY);
        assert_eq!(port.sent.len(), 1);
        assert_eq!(d.pending_clears(), 0, "due clear consumed, not resent later");
    }

    #[test]
    fn failed_pulse_does_not_arm_a_clear() {
        let (mut d, mut port) = make();
        port.fail_next = true;
        d.send_pulse(&mut port, true, 0, ChannelId::EncoderGesture, "single click");
        assert!(port.sent.is_empty());
        assert_eq!(d.pending_clears(), 0);
    }

    #[test]
    fn encoder_gestures_use_the_gesture_channel() {
        let (mut d, mut port) = make();
        let ev = GestureEvent {
            button: ButtonId::Encoder,
            gesture: Gesture::MultiClick(4),
        };
        d.dispatch_gesture(&mut port, true, 0, &ev);
        assert_eq!(
            port.sent[0],
            (ChannelId::EncoderGesture, "multi click".to_string())
        );
    }

    #[test]
    fn media_buttons_route_by_click_count() {
        let (mut d, mut port) = make();
        d.dispatch_gesture(
            &mut port,
            true,
            0,
            &GestureEvent {
                button: ButtonId::Gaming,
                gesture: Gesture::SingleClick,
            },
        );
        d.dispatch_gesture(
            &mut port,
            true,
            10,
            &GestureEvent {
                button: ButtonId::Chat,
                gesture: Gesture::DoubleClick,
            },
        );
        assert_eq!(port.sent[0], (ChannelId::MediaSingle, "Gaming".to_string()));
        assert_eq!(port.sent[1], (ChannelId::MediaDouble, "Chat".to_string()));
    }

    #[test]
    fn unrouted_media_gestures_are_dropped() {
        let (mut d, mut port) = make();
        d.dispatch_gesture(
            &mut port,
            true,
            0,
            &GestureEvent {
                button: ButtonId::Aux,
                gesture: Gesture::LongPressRelease,
            },
        );
        assert!(port.sent.is_empty());
        assert_eq!(d.pending_clears(), 0);
    }

    #[test]
    fn payload_formats() {
        assert_eq!(position_payload(3, 87).as_str(), "3 87");
        assert_eq!(position_payload(-12, 5).as_str(), "-12 5");
        assert_eq!(reset_payload(64).as_str(), "reset 64");
        assert_eq!(gesture_label(Gesture::LongPressRelease), "long press release");
    }
}
