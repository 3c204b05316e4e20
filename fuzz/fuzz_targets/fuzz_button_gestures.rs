//! Fuzz target: `ButtonDriver::tick`
//!
//! Drives arbitrary level/timing sequences through the debounce and
//! gesture state machine and asserts that it never panics and only
//! produces well-formed gestures (a multi-click always carries a count
//! of three or more).
//!
//! cargo fuzz run fuzz_button_gestures

#![no_main]

use libfuzzer_sys::fuzz_target;
use tappie::app::events::{ButtonId, Gesture};
use tappie::drivers::button::{ButtonDriver, GestureTiming};

fuzz_target!(|data: &[u8]| {
    let mut btn = ButtonDriver::new(ButtonId::Encoder, 34, GestureTiming::default());

    // Each byte is one sample: low 7 bits scale the time step, the top
    // bit is the switch level.  Wrapping timestamps are fair game.
    let mut t = 0u32;
    for b in data {
        t = t.wrapping_add(u32::from(b & 0x7f) * 37);
        let pressed = b & 0x80 != 0;
        if let Some(gesture) = btn.tick(t, pressed) {
            match gesture {
                Gesture::MultiClick(n) => assert!(n >= 3, "multi-click with count {n}"),
                Gesture::SingleClick | Gesture::DoubleClick | Gesture::LongPressRelease => {}
            }
        }
    }
});
