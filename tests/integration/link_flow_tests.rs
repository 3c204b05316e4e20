//! Connection lifecycle flow tests.
//!
//! Replicates the main-loop ordering: connection edges are handled
//! before any user-driven notification, so a freshly connected central
//! is always resynchronized first.

use tappie::app::connection::{ConnectionSupervisor, ConnectionTransition};
use tappie::app::dispatcher::{position_payload, ChannelId, NotificationDispatcher};
use tappie::app::tracker::{PositionTracker, PositionUpdate};

use crate::mock_hw::MockNotifyPort;

const SETTLE: u32 = 500;
const PULSE_DELAY: u32 = 100;
const RESET_TIMEOUT: u32 = 5000;

#[test]
fn connect_resync_precedes_movement() {
    let mut conn = ConnectionSupervisor::new(SETTLE);
    let mut tracker = PositionTracker::new(RESET_TIMEOUT, 0);
    let mut dispatcher = NotificationDispatcher::new(PULSE_DELAY);
    let mut port = MockNotifyPort::new();

    // The knob was turned to detent 2 while nobody was connected.
    assert_eq!(
        tracker.update(4, 0),
        Some(PositionUpdate::Changed { position: 2 })
    );
    dispatcher.send_level(
        &mut port,
        conn.is_connected(),
        ChannelId::EncoderPosition,
        &position_payload(2, 87),
    );
    assert!(port.sent.is_empty(), "nothing goes out while disconnected");

    // A central connects during an iteration that also sees movement.
    let now = 1000;
    if let Some(ConnectionTransition::Connected) = conn.poll(true, now) {
        dispatcher.send_level(
            &mut port,
            true,
            ChannelId::EncoderPosition,
            &position_payload(tracker.position(), 87),
        );
    }
    if let Some(PositionUpdate::Changed { position }) = tracker.update(6, now) {
        dispatcher.send_level(
            &mut port,
            conn.is_connected(),
            ChannelId::EncoderPosition,
            &position_payload(position, 87),
        );
    }

    assert_eq!(
        port.payloads_for(ChannelId::EncoderPosition),
        vec!["2 87", "3 87"],
        "resync first, then the movement"
    );
}

#[test]
fn disconnect_drops_clears_then_readvertises() {
    let mut conn = ConnectionSupervisor::new(SETTLE);
    let mut dispatcher = NotificationDispatcher::new(PULSE_DELAY);
    let mut port = MockNotifyPort::new();

    conn.poll(true, 0);
    dispatcher.send_pulse(&mut port, true, 10, ChannelId::EncoderGesture, "single click");
    assert_eq!(dispatcher.pending_clears(), 1);

    // Central drops before the clear comes due.
    assert_eq!(conn.poll(false, 50), Some(ConnectionTransition::Disconnected));
    dispatcher.drop_pending();

    dispatcher.flush_pending(&mut port, conn.is_connected(), 10 + PULSE_DELAY);
    assert_eq!(port.sent.len(), 1, "the orphaned clear never fires");

    // Advertising restarts only after the settle delay.
    assert!(!conn.due_readvertise(50 + SETTLE - 1));
    assert!(conn.due_readvertise(50 + SETTLE));
    assert!(!conn.due_readvertise(50 + SETTLE * 3), "one restart per drop");
}

#[test]
fn reconnect_before_settle_skips_readvertise() {
    let mut conn = ConnectionSupervisor::new(SETTLE);
    let mut tracker = PositionTracker::new(RESET_TIMEOUT, 0);
    let mut dispatcher = NotificationDispatcher::new(PULSE_DELAY);
    let mut port = MockNotifyPort::new();

    conn.poll(true, 0);
    conn.poll(false, 100);
    // The central comes straight back.
    assert_eq!(conn.poll(true, 200), Some(ConnectionTransition::Connected));
    dispatcher.send_level(
        &mut port,
        true,
        ChannelId::EncoderPosition,
        &position_payload(tracker.position(), 92),
    );

    assert!(
        !conn.due_readvertise(100 + SETTLE * 2),
        "pending restart was cancelled by the reconnect"
    );
    assert_eq!(
        port.payloads_for(ChannelId::EncoderPosition),
        vec!["0 92"],
        "the new session still gets its resync"
    );
}
