//! Tappie Firmware — Main Entry Point
//!
//! Hexagonal architecture driven by one cooperative polling loop.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  BleAdapter     LogEventSink     Clock                       │
//! │  (NotifyPort)   (EventSink)      (monotonic ms)              │
//! │                                                              │
//! │  ─────────────── Port Trait Boundary ────────────────        │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────┐      │
//! │  │           Application core (pure logic)            │      │
//! │  │  PositionTracker · NotificationDispatcher          │      │
//! │  │  ConnectionSupervisor · gesture classification     │      │
//! │  └────────────────────────────────────────────────────┘      │
//! │                                                              │
//! │  ButtonDriver · encoder (PCNT) · battery/reed sensors        │
//! │  SleepSupervisor (reed-triggered deep sleep)                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{error, info, warn};

use tappie::adapters::ble::{self, BleAdapter};
use tappie::adapters::log_sink::LogEventSink;
use tappie::adapters::time::Clock;
use tappie::app::connection::{ConnectionSupervisor, ConnectionTransition};
use tappie::app::dispatcher::{
    position_payload, reset_payload, ChannelId, NotificationDispatcher,
};
use tappie::app::events::{AppEvent, ButtonId, GestureEvent};
use tappie::app::ports::EventSink;
use tappie::app::tracker::{PositionTracker, PositionUpdate};
use tappie::config::SystemConfig;
use tappie::drivers::button::{ButtonDriver, GestureTiming};
use tappie::drivers::watchdog::Watchdog;
use tappie::drivers::{encoder, hw_init};
use tappie::power::{self, SleepSupervisor};
use tappie::sensors::battery::BatterySampler;
use tappie::sensors::reed::ReedSwitch;
use tappie::{pins, Error};

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    #[cfg(target_os = "espidf")]
    {
        esp_idf_svc::sys::link_patches();
        esp_idf_logger::init()?;
    }

    info!("╔══════════════════════════════════════╗");
    info!("║  Tappie v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Peripherals ────────────────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        // Peripheral init failure is critical — log and halt.
        // In production this triggers the watchdog reset after timeout.
        error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    let config = SystemConfig::default();
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("{}", Error::Config(e)))?;

    // ── 3. Early re-sleep check ───────────────────────────────
    // Before BLE comes up: a spurious wake with the lid still closed
    // must return to deep sleep without emitting a single advertisement.
    let reed = ReedSwitch::new();
    if power::boot_resleep_required(reed.is_awake(), config.deep_sleep_enabled) {
        info!("boot: lid still closed — returning to deep sleep");
        power::enter_deep_sleep();
    }

    let watchdog = Watchdog::new();
    let clock = Clock::new();
    let mut sink = LogEventSink::new();

    sink.emit(&AppEvent::Started {
        cause: power::wake_cause(),
        resumed_link: power::link_before_sleep(),
    });

    // ── 4. Application core ───────────────────────────────────
    let now = clock.now_ms();
    let timing = GestureTiming {
        debounce_ms: config.debounce_ms,
        multi_click_window_ms: config.multi_click_window_ms,
        long_press_ms: config.long_press_ms,
    };
    let mut buttons = [
        ButtonDriver::new(ButtonId::Encoder, pins::ENCODER_SW_GPIO, timing),
        ButtonDriver::new(ButtonId::Master, pins::BTN_MASTER_GPIO, timing),
        ButtonDriver::new(ButtonId::Gaming, pins::BTN_GAMING_GPIO, timing),
        ButtonDriver::new(ButtonId::Aux, pins::BTN_AUX_GPIO, timing),
        ButtonDriver::new(ButtonId::Media, pins::BTN_MEDIA_GPIO, timing),
        ButtonDriver::new(ButtonId::Chat, pins::BTN_CHAT_GPIO, timing),
    ];
    let mut tracker = PositionTracker::new(config.auto_reset_timeout_ms, now);
    let mut dispatcher = NotificationDispatcher::new(config.pulse_clear_delay_ms);
    let mut conn = ConnectionSupervisor::new(config.readvertise_settle_ms);
    let mut battery = BatterySampler::new(
        config.battery_sample_interval_ms,
        config.low_battery_percent,
        now,
    );
    // Seed with the live reed level: booting with the lid closed (sleep
    // disabled) must not read as a falling edge on the first poll.
    let mut sleep = SleepSupervisor::new(config.reed_poll_interval_ms, now, reed.is_awake());

    // ── 5. BLE ────────────────────────────────────────────────
    let mut ble = BleAdapter::new(
        config.device_name.clone(),
        config.conn_interval_min_slots,
        config.conn_interval_max_slots,
    );
    if let Err(e) = ble.start() {
        error!("BLE start failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    info!("System ready. Entering poll loop.");

    // ── 6. Poll loop ──────────────────────────────────────────
    loop {
        let now = clock.now_ms();

        // Connection edges first: the resynchronization notification
        // must precede any user-driven notification this iteration.
        match conn.poll(ble::link_up(), now) {
            Some(ConnectionTransition::Connected) => {
                sink.emit(&AppEvent::ClientConnected);
                if config.reset_position_on_connect {
                    tracker.reset(now);
                    encoder::clear();
                }
                let payload = position_payload(tracker.position(), battery.percent());
                dispatcher.send_level(&mut ble, true, ChannelId::EncoderPosition, &payload);
            }
            Some(ConnectionTransition::Disconnected) => {
                sink.emit(&AppEvent::ClientDisconnected);
                dispatcher.drop_pending();
            }
            None => {}
        }
        // is_active() guards the sleep-disabled case, where the stack
        // was torn down but the loop keeps running.
        if conn.due_readvertise(now) && ble.is_active() {
            ble.start_advertising();
            sink.emit(&AppEvent::AdvertisingStarted);
        }
        let connected = conn.is_connected();

        // Encoder position.
        match tracker.update(encoder::count(), now) {
            Some(PositionUpdate::Changed { position }) => {
                sink.emit(&AppEvent::PositionChanged {
                    position,
                    battery_percent: battery.percent(),
                });
                let payload = position_payload(position, battery.percent());
                dispatcher.send_level(&mut ble, connected, ChannelId::EncoderPosition, &payload);
            }
            Some(PositionUpdate::Reset) => {
                encoder::clear();
                sink.emit(&AppEvent::PositionReset);
                let payload = reset_payload(battery.percent());
                dispatcher.send_level(&mut ble, connected, ChannelId::EncoderPosition, &payload);
            }
            None => {}
        }

        // Button gestures (switches are active-low).
        for button in &mut buttons {
            let pressed = !hw_init::gpio_read(button.gpio());
            if let Some(gesture) = button.tick(now, pressed) {
                let event = GestureEvent {
                    button: button.id(),
                    gesture,
                };
                sink.emit(&AppEvent::Gesture(event));
                dispatcher.dispatch_gesture(&mut ble, connected, now, &event);
            }
        }

        // Deferred pulse clears.
        dispatcher.flush_pending(&mut ble, connected, now);

        // Battery sampling.
        if let Some(percent) = battery.tick(now) {
            sink.emit(&AppEvent::BatteryLow { percent });
        }

        // Sleep supervision — the shutdown sequence is the last thing an
        // iteration does; pending clears die with the transport.
        if sleep.poll(now, reed.is_awake()) {
            let link_was_up = conn.is_connected();
            sink.emit(&AppEvent::SleepPending { link_was_up });
            power::store_link_before_sleep(link_was_up);
            dispatcher.drop_pending();
            ble.force_disconnect();
            ble.stop();
            if config.deep_sleep_enabled {
                power::enter_deep_sleep();
            }
            warn!("power: deep sleep disabled by config — staying awake");
        }

        watchdog.feed();

        std::thread::sleep(std::time::Duration::from_millis(u64::from(
            config.loop_delay_ms,
        )));
    }
}
