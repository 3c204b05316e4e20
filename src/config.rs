//! System configuration parameters
//!
//! All tunable parameters for the Tappie controller.  Values are compiled-in
//! defaults; the struct serialises cleanly so a future provisioning channel
//! can override them without touching the field consumers.

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Identity ---
    /// BLE device name used in advertising.
    pub device_name: heapless::String<24>,

    // --- Button gestures ---
    /// Level must hold steady this long before an edge counts (milliseconds).
    pub debounce_ms: u32,
    /// Window after a release in which further clicks accumulate (milliseconds).
    pub multi_click_window_ms: u32,
    /// Hold duration that turns a press into a long press (milliseconds).
    pub long_press_ms: u32,

    // --- Encoder ---
    /// Idle time after which a non-zero position snaps back to 0 (milliseconds).
    pub auto_reset_timeout_ms: u32,
    /// Zero the position when a client connects (off by default — the client
    /// is resynced with the live position instead).
    pub reset_position_on_connect: bool,

    // --- Notifications ---
    /// Delay before a pulse characteristic is cleared back to "0" (milliseconds).
    pub pulse_clear_delay_ms: u32,

    // --- Connection ---
    /// Settle time after a disconnect before advertising restarts (milliseconds).
    pub readvertise_settle_ms: u32,
    /// Preferred connection interval carried in advertising data (1.25 ms slots).
    pub conn_interval_min_slots: u16,
    pub conn_interval_max_slots: u16,

    // --- Power ---
    /// Reed switch sampling interval (milliseconds).
    pub reed_poll_interval_ms: u32,
    /// When false, a reed closure is logged but the device stays awake.
    pub deep_sleep_enabled: bool,

    // --- Battery ---
    /// Battery sampling interval (milliseconds).
    pub battery_sample_interval_ms: u32,
    /// Percentage at or below which the low-battery advisory fires.
    pub low_battery_percent: u8,

    // --- Timing ---
    /// Main loop inter-iteration delay (milliseconds).
    pub loop_delay_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let mut device_name = heapless::String::new();
        let _ = device_name.push_str("TappieV2");
        Self {
            device_name,

            // Gestures
            debounce_ms: 30,
            multi_click_window_ms: 400,
            long_press_ms: 1000,

            // Encoder
            auto_reset_timeout_ms: 5000,
            reset_position_on_connect: false,

            // Notifications
            pulse_clear_delay_ms: 100,

            // Connection
            readvertise_settle_ms: 500,
            conn_interval_min_slots: 0x06, // 7.5 ms
            conn_interval_max_slots: 0x12, // 22.5 ms

            // Power
            reed_poll_interval_ms: 500,
            deep_sleep_enabled: true,

            // Battery
            battery_sample_interval_ms: 1000,
            low_battery_percent: 20,

            // Timing
            loop_delay_ms: 5, // 200 Hz poll
        }
    }
}

impl SystemConfig {
    /// Range-check the configuration.  Returns the first offending field.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.device_name.is_empty() {
            return Err("device_name must not be empty");
        }
        if self.debounce_ms == 0 || self.debounce_ms >= self.multi_click_window_ms {
            return Err("debounce_ms must be non-zero and below multi_click_window_ms");
        }
        if self.long_press_ms <= self.multi_click_window_ms {
            return Err("long_press_ms must exceed multi_click_window_ms");
        }
        if self.auto_reset_timeout_ms < 1000 {
            return Err("auto_reset_timeout_ms below 1s would fight normal rotation");
        }
        if self.conn_interval_min_slots > self.conn_interval_max_slots {
            return Err("conn_interval_min_slots above conn_interval_max_slots");
        }
        if self.low_battery_percent > 100 {
            return Err("low_battery_percent above 100");
        }
        if self.loop_delay_ms == 0 || self.loop_delay_ms > self.debounce_ms {
            return Err("loop_delay_ms must be non-zero and below debounce_ms");
        }
        Ok(())
    }
}
