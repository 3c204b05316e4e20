//! Fuzz target: `NotificationDispatcher`
//!
//! Interleaves pulse sends, level sends, flushes, connection drops, and
//! pending-clear drops in arbitrary order and asserts the clear queue
//! never overflows, never leaks, and never fires a clear for a channel
//! that had no pulse.
//!
//! cargo fuzz run fuzz_dispatcher

#![no_main]

use libfuzzer_sys::fuzz_target;
use tappie::app::dispatcher::{ChannelId, NotificationDispatcher};
use tappie::app::ports::{NotifyError, NotifyPort};

struct CountingPort {
    clears: [usize; 3],
    pulses: [usize; 3],
}

fn pulse_index(channel: ChannelId) -> Option<usize> {
    match channel {
        ChannelId::EncoderGesture => Some(0),
        ChannelId::MediaSingle => Some(1),
        ChannelId::MediaDouble => Some(2),
        ChannelId::EncoderPosition => None,
    }
}

impl NotifyPort for CountingPort {
    fn notify(&mut self, channel: ChannelId, payload: &str) -> Result<(), NotifyError> {
        if let Some(i) = pulse_index(channel) {
            if payload == "0" {
                self.clears[i] += 1;
            } else {
                self.pulses[i] += 1;
            }
        }
        Ok(())
    }
}

fuzz_target!(|data: &[u8]| {
    let mut dispatcher = NotificationDispatcher::new(100);
    let mut port = CountingPort {
        clears: [0; 3],
        pulses: [0; 3],
    };
    let mut t = 0u32;
    let mut connected = true;

    for b in data {
        t = t.wrapping_add(u32::from(b >> 4) * 10);
        match b & 0x0f {
            0..=2 => {
                let channel = match b & 0x0f {
                    0 => ChannelId::EncoderGesture,
                    1 => ChannelId::MediaSingle,
                    _ => ChannelId::MediaDouble,
                };
                dispatcher.send_pulse(&mut port, connected, t, channel, "x");
            }
            3 => {
                dispatcher.send_level(&mut port, connected, ChannelId::EncoderPosition, "1 50");
            }
            4 => {
                connected = !connected;
                if !connected {
                    dispatcher.drop_pending();
                }
            }
            5 => dispatcher.drop_pending(),
            _ => dispatcher.flush_pending(&mut port, connected, t),
        }
        assert!(dispatcher.pending_clears() <= 3, "clear queue overflow");
    }

    // Whatever happened, no channel cleared more often than it pulsed.
    for i in 0..3 {
        assert!(
            port.clears[i] <= port.pulses[i],
            "channel {i} cleared {} times for {} pulses",
            port.clears[i],
            port.pulses[i]
        );
    }
});
