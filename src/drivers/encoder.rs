//! Quadrature encoder counter access.
//!
//! The PCNT peripheral decodes the encoder in hardware: it counts edges
//! of phase A with the direction taken from phase B (half-quadrature,
//! two counts per detent).  This module only exposes read/clear over the
//! running counter — detent conversion and idle-reset policy live in
//! [`PositionTracker`](crate::app::tracker::PositionTracker).
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads PCNT unit 0 (configured by `hw_init`).
//! On host/test: reads from a static `AtomicI32` for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicI32, Ordering};

#[cfg(not(target_os = "espidf"))]
static SIM_COUNT: AtomicI32 = AtomicI32::new(0);

/// Inject a raw counter value (host tests).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_count(raw: i32) {
    SIM_COUNT.store(raw, Ordering::Relaxed);
}

/// Advance the simulated counter by `delta` pulses (host tests).
#[cfg(not(target_os = "espidf"))]
pub fn sim_add_pulses(delta: i32) {
    SIM_COUNT.fetch_add(delta, Ordering::Relaxed);
}

/// Current raw half-quadrature count.
#[cfg(target_os = "espidf")]
pub fn count() -> i32 {
    let mut raw: i16 = 0;
    // SAFETY: PCNT unit 0 was configured in hw_init before the main loop
    // started; the counter register read is main-loop only.
    let ret = unsafe {
        esp_idf_svc::sys::pcnt_get_counter_value(
            esp_idf_svc::sys::pcnt_unit_t_PCNT_UNIT_0,
            &mut raw,
        )
    };
    if ret != esp_idf_svc::sys::ESP_OK {
        return 0;
    }
    i32::from(raw)
}

#[cfg(not(target_os = "espidf"))]
pub fn count() -> i32 {
    SIM_COUNT.load(Ordering::Relaxed)
}

/// Zero the hardware counter.  Called on position reset so the tracker
/// and the peripheral agree on where zero is.
#[cfg(target_os = "espidf")]
pub fn clear() {
    // SAFETY: same single-threaded access contract as count().
    unsafe {
        esp_idf_svc::sys::pcnt_counter_clear(esp_idf_svc::sys::pcnt_unit_t_PCNT_UNIT_0);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn clear() {
    SIM_COUNT.store(0, Ordering::Relaxed);
}
