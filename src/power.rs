//! Deep-sleep supervision and wake-cause handling.
//!
//! The reed switch is the only sleep trigger: closing the lid (magnet
//! present, pin LOW) puts the device into deep sleep, removing the magnet
//! (pin HIGH, EXT0 wake) restarts execution from the top of `main()`.
//! All volatile state is rebuilt from defaults on wake; the single value
//! that survives the cycle is [`LINK_BEFORE_SLEEP`], kept in RTC slow
//! memory, recording whether a BLE central was connected when the lid
//! closed.
//!
//! [`SleepSupervisor`] does the polling-and-edge-detection half; the
//! actual halt lives in [`enter_deep_sleep`] because it never returns
//! and must be the caller's last act.

use core::sync::atomic::{AtomicBool, Ordering};

use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

// ── Wake cause ────────────────────────────────────────────────

/// Why this boot happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeCause {
    /// Cold boot (power applied or reset button).
    PowerOn,
    /// EXT0 wake — the reed magnet was removed.
    ReedWake,
    /// Any other wakeup source (timer, brownout recovery).
    Other,
}

#[cfg(target_os = "espidf")]
pub fn wake_cause() -> WakeCause {
    use esp_idf_svc::sys::*;
    // SAFETY: reads a cached register value set by the ROM bootloader.
    let cause = unsafe { esp_sleep_get_wakeup_cause() };
    match cause {
        c if c == esp_sleep_source_t_ESP_SLEEP_WAKEUP_EXT0 => WakeCause::ReedWake,
        c if c == esp_sleep_source_t_ESP_SLEEP_WAKEUP_UNDEFINED => WakeCause::PowerOn,
        _ => WakeCause::Other,
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn wake_cause() -> WakeCause {
    WakeCause::PowerOn
}

// ── RTC-retained state ────────────────────────────────────────

/// The one value that survives a deep-sleep cycle: whether a central was
/// connected when sleep began.  RTC slow memory keeps its contents while
/// the main RAM loses power.
#[cfg_attr(target_os = "espidf", unsafe(link_section = ".rtc.data"))]
static LINK_BEFORE_SLEEP: AtomicBool = AtomicBool::new(false);

pub fn store_link_before_sleep(connected: bool) {
    LINK_BEFORE_SLEEP.store(connected, Ordering::Relaxed);
}

/// Only meaningful when [`wake_cause`] reports [`WakeCause::ReedWake`];
/// on a cold boot RTC memory holds the linker default (`false`).
pub fn link_before_sleep() -> bool {
    LINK_BEFORE_SLEEP.load(Ordering::Relaxed)
}

// ── Boot re-sleep decision ────────────────────────────────────

/// Boot-time check, made after minimal GPIO init and before the BLE
/// stack comes up: a wake with the lid still closed goes straight back
/// to deep sleep without emitting a single advertisement.  With deep
/// sleep disabled by config the boot proceeds and the supervisor below
/// is seeded with the closed-lid level instead.
pub fn boot_resleep_required(reed_awake: bool, deep_sleep_enabled: bool) -> bool {
    !reed_awake && deep_sleep_enabled
}

// ── Sleep supervisor ──────────────────────────────────────────

/// Samples the reed level on a fixed interval and reports the
/// awake→sleep edge exactly once.
pub struct SleepSupervisor {
    poll_interval_ms: u32,
    last_poll_ms: u32,
    prev_awake: bool,
}

impl SleepSupervisor {
    pub fn new(poll_interval_ms: u32, now_ms: u32, initially_awake: bool) -> Self {
        Self {
            poll_interval_ms,
            last_poll_ms: now_ms,
            prev_awake: initially_awake,
        }
    }

    /// Feed the current reed level each loop iteration; the level is only
    /// evaluated once per poll interval.  Returns `true` exactly on a
    /// falling (awake→sleep) edge.
    pub fn poll(&mut self, now_ms: u32, awake: bool) -> bool {
        if now_ms.wrapping_sub(self.last_poll_ms) < self.poll_interval_ms {
            return false;
        }
        self.last_poll_ms = now_ms;
        let edge = self.prev_awake && !awake;
        self.prev_awake = awake;
        edge
    }
}

// ── Deep sleep entry ──────────────────────────────────────────

/// Arm EXT0 wake on the reed pin going HIGH (magnet removed) and halt.
/// Execution resumes at the top of `main()`; only RTC memory survives.
#[cfg(target_os = "espidf")]
pub fn enter_deep_sleep() -> ! {
    use esp_idf_svc::sys::*;
    info!(
        "power: entering deep sleep, EXT0 wake on GPIO{} high",
        pins::REED_GPIO
    );
    unsafe {
        esp_sleep_enable_ext0_wakeup(pins::REED_GPIO, 1);
        esp_deep_sleep_start();
    }
    // esp_deep_sleep_start does not return.
    unreachable!()
}

#[cfg(not(target_os = "espidf"))]
pub fn enter_deep_sleep() -> ! {
    info!("power(sim): deep sleep — exiting process");
    std::process::exit(0)
}
