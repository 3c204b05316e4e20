//! Fuzz target: `PositionTracker::update`
//!
//! Feeds arbitrary raw counter values and time steps into the tracker
//! and asserts the core invariants: the reported position always equals
//! the raw count divided down to detents (until an idle reset zeroes
//! it), and no two consecutive updates report the same position.
//!
//! cargo fuzz run fuzz_position_tracker

#![no_main]

use libfuzzer_sys::fuzz_target;
use tappie::app::tracker::{PositionTracker, PositionUpdate, PULSES_PER_DETENT};

fuzz_target!(|data: &[u8]| {
    let mut tracker = PositionTracker::new(5000, 0);
    let mut t = 0u32;
    let mut last_emitted = 0i32;

    for chunk in data.chunks_exact(3) {
        // Two bytes of signed count, one byte of time step.
        let raw = i32::from(i16::from_le_bytes([chunk[0], chunk[1]]));
        t = t.wrapping_add(u32::from(chunk[2]) * 100);

        match tracker.update(raw, t) {
            Some(PositionUpdate::Changed { position }) => {
                assert_eq!(position, raw / PULSES_PER_DETENT);
                assert_ne!(position, last_emitted, "duplicate change report");
                last_emitted = position;
            }
            Some(PositionUpdate::Reset) => {
                assert_eq!(tracker.position(), 0);
                last_emitted = 0;
            }
            None => {}
        }
    }
});
