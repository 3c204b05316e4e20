//! Monotonic clock adapter.
//!
//! Every timing decision in the firmware (debounce windows, pulse-clear
//! deadlines, idle reset) works on a `u32` millisecond timestamp with
//! `wrapping_sub` arithmetic, so the ~49-day wrap is harmless.
//!
//! - **`target_os = "espidf"`** — wraps `esp_timer_get_time()` from the
//!   ESP-IDF high-resolution timer (monotonic).
//! - **`not(target_os = "espidf")`** — uses `std::time::Instant` for
//!   host-side testing and simulation.

pub struct Clock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Milliseconds since boot (monotonic, wraps at `u32::MAX`).
    #[cfg(target_os = "espidf")]
    pub fn now_ms(&self) -> u32 {
        // SAFETY: esp_timer_get_time is a plain counter read.
        ((unsafe { esp_idf_svc::sys::esp_timer_get_time() }) / 1_000) as u32
    }

    /// Milliseconds since construction (monotonic, wraps at `u32::MAX`).
    #[cfg(not(target_os = "espidf"))]
    pub fn now_ms(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }
}
