//! Button-to-notification flow tests.
//!
//! Drives the debouncing button driver and the notification dispatcher
//! together, the way the main loop wires them, and asserts on what a
//! connected central would actually receive.

use tappie::app::dispatcher::{ChannelId, NotificationDispatcher};
use tappie::app::events::{ButtonId, Gesture, GestureEvent};
use tappie::drivers::button::{ButtonDriver, GestureTiming};

use crate::mock_hw::MockNotifyPort;

const T: GestureTiming = GestureTiming {
    debounce_ms: 30,
    multi_click_window_ms: 400,
    long_press_ms: 1000,
};
const PULSE_DELAY: u32 = 100;

/// One main-loop style step: sample, classify, dispatch, flush clears.
fn step(
    btn: &mut ButtonDriver,
    dispatcher: &mut NotificationDispatcher,
    port: &mut MockNotifyPort,
    connected: bool,
    now_ms: u32,
    pressed: bool,
) {
    if let Some(gesture) = btn.tick(now_ms, pressed) {
        let event = GestureEvent {
            button: btn.id(),
            gesture,
        };
        dispatcher.dispatch_gesture(port, connected, now_ms, &event);
    }
    dispatcher.flush_pending(port, connected, now_ms);
}

/// Drive a full press/release cycle; returns the time after the release
/// debounce settled.
fn press_release(
    btn: &mut ButtonDriver,
    dispatcher: &mut NotificationDispatcher,
    port: &mut MockNotifyPort,
    connected: bool,
    start_ms: u32,
    hold_ms: u32,
) -> u32 {
    let mut t = start_ms;
    step(btn, dispatcher, port, connected, t, true);
    t += T.debounce_ms;
    step(btn, dispatcher, port, connected, t, true);
    t += hold_ms;
    step(btn, dispatcher, port, connected, t, true);
    step(btn, dispatcher, port, connected, t, false);
    t += T.debounce_ms;
    step(btn, dispatcher, port, connected, t, false);
    t
}

#[test]
fn encoder_single_click_pulses_then_clears() {
    let mut btn = ButtonDriver::new(ButtonId::Encoder, 34, T);
    let mut dispatcher = NotificationDispatcher::new(PULSE_DELAY);
    let mut port = MockNotifyPort::new();

    let t = press_release(&mut btn, &mut dispatcher, &mut port, true, 0, 50);
    assert!(port.sent.is_empty(), "gesture pends until the window closes");

    // Window closes: the pulse goes out, the clear is still armed.
    let close = t + T.multi_click_window_ms;
    step(&mut btn, &mut dispatcher, &mut port, true, close, false);
    assert_eq!(
        port.payloads_for(ChannelId::EncoderGesture),
        vec!["single click"]
    );

    // The clear follows one pulse delay later, not before.
    step(&mut btn, &mut dispatcher, &mut port, true, close + PULSE_DELAY - 1, false);
    assert_eq!(port.payloads_for(ChannelId::EncoderGesture).len(), 1);
    step(&mut btn, &mut dispatcher, &mut port, true, close + PULSE_DELAY, false);
    assert_eq!(
        port.payloads_for(ChannelId::EncoderGesture),
        vec!["single click", "0"]
    );
}

#[test]
fn encoder_long_press_reports_on_release() {
    let mut btn = ButtonDriver::new(ButtonId::Encoder, 34, T);
    let mut dispatcher = NotificationDispatcher::new(PULSE_DELAY);
    let mut port = MockNotifyPort::new();

    let t = press_release(
        &mut btn,
        &mut dispatcher,
        &mut port,
        true,
        0,
        T.long_press_ms + 200,
    );
    // Long press needs no window close — it fires as the release settles.
    assert_eq!(
        port.payloads_for(ChannelId::EncoderGesture),
        vec!["long press release"]
    );

    // And no trailing click sneaks out after the window.
    step(
        &mut btn,
        &mut dispatcher,
        &mut port,
        true,
        t + T.multi_click_window_ms + PULSE_DELAY,
        false,
    );
    assert_eq!(
        port.payloads_for(ChannelId::EncoderGesture),
        vec!["long press release", "0"]
    );
}

#[test]
fn media_buttons_report_their_names() {
    let mut gaming = ButtonDriver::new(ButtonId::Gaming, 26, T);
    let mut chat = ButtonDriver::new(ButtonId::Chat, 13, T);
    let mut dispatcher = NotificationDispatcher::new(PULSE_DELAY);
    let mut port = MockNotifyPort::new();

    // Gaming: one click.
    let t = press_release(&mut gaming, &mut dispatcher, &mut port, true, 0, 40);
    step(
        &mut gaming,
        &mut dispatcher,
        &mut port,
        true,
        t + T.multi_click_window_ms,
        false,
    );

    // Chat: two clicks inside the window.
    let base = 10_000;
    let t1 = press_release(&mut chat, &mut dispatcher, &mut port, true, base, 40);
    let t2 = press_release(&mut chat, &mut dispatcher, &mut port, true, t1 + 80, 40);
    step(
        &mut chat,
        &mut dispatcher,
        &mut port,
        true,
        t2 + T.multi_click_window_ms,
        false,
    );

    assert_eq!(port.payloads_for(ChannelId::MediaSingle)[0], "Gaming");
    assert_eq!(port.payloads_for(ChannelId::MediaDouble)[0], "Chat");
}

#[test]
fn disconnected_gestures_reach_nothing() {
    let mut btn = ButtonDriver::new(ButtonId::Master, 25, T);
    let mut dispatcher = NotificationDispatcher::new(PULSE_DELAY);
    let mut port = MockNotifyPort::new();

    let t = press_release(&mut btn, &mut dispatcher, &mut port, false, 0, 40);
    step(
        &mut btn,
        &mut dispatcher,
        &mut port,
        false,
        t + T.multi_click_window_ms + PULSE_DELAY,
        false,
    );
    assert!(port.sent.is_empty());
    assert_eq!(dispatcher.pending_clears(), 0);
}

#[test]
fn rapid_pulses_share_one_clear() {
    let mut dispatcher = NotificationDispatcher::new(PULSE_DELAY);
    let mut port = MockNotifyPort::new();

    // Two media singles 50 ms apart, as from two different buttons.
    dispatcher.dispatch_gesture(
        &mut port,
        true,
        0,
        &GestureEvent {
            button: ButtonId::Master,
            gesture: Gesture::SingleClick,
        },
    );
    dispatcher.dispatch_gesture(
        &mut port,
        true,
        50,
        &GestureEvent {
            button: ButtonId::Media,
            gesture: Gesture::SingleClick,
        },
    );
    assert_eq!(dispatcher.pending_clears(), 1, "re-armed, not stacked");

    dispatcher.flush_pending(&mut port, true, 50 + PULSE_DELAY);
    assert_eq!(
        port.payloads_for(ChannelId::MediaSingle),
        vec!["Master", "Media", "0"]
    );
}
