//! Reed switch (lid sensor) sampling.
//!
//! Wired to ground with the internal pull-up: HIGH means the magnet is
//! absent (lid open, device awake), LOW means the magnet is present
//! (lid closed, go to sleep).  Each read takes a best-of-three majority
//! so a single glitched register read cannot fake a sleep edge.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the GPIO level (configured by hw_init).
//! On host/test: reads from a static `AtomicBool` for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, Ordering};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::pins;

/// Default HIGH: magnet absent, device awake.
#[cfg(not(target_os = "espidf"))]
static SIM_REED_LEVEL: AtomicBool = AtomicBool::new(true);

/// Inject the reed level (host tests).  `true` = awake, `false` = sleep.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_reed_level(high: bool) {
    SIM_REED_LEVEL.store(high, Ordering::Relaxed);
}

pub struct ReedSwitch {
    _gpio: i32,
}

impl ReedSwitch {
    pub fn new() -> Self {
        Self {
            _gpio: pins::REED_GPIO,
        }
    }

    /// `true` while the magnet is absent (device should stay awake).
    pub fn is_awake(&self) -> bool {
        let a = self.read_level();
        let b = self.read_level();
        let c = self.read_level();
        (a && b) || (a && c) || (b && c)
    }

    #[cfg(target_os = "espidf")]
    fn read_level(&self) -> bool {
        hw_init::gpio_read(self._gpio)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_level(&self) -> bool {
        SIM_REED_LEVEL.load(Ordering::Relaxed)
    }
}

impl Default for ReedSwitch {
    fn default() -> Self {
        Self::new()
    }
}
