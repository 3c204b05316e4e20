//! Task Watchdog Timer (TWDT) driver.
//!
//! Resets the device if the polling loop stalls.  The loop runs every
//! few milliseconds, so a missed feed window means the firmware is wedged
//! (a blocked BLE call, a runaway unsafe path) and a reset is the right
//! outcome.  `feed()` must be called once per loop iteration.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

/// Reset threshold — generous against the millisecond-scale loop.
#[cfg(target_os = "espidf")]
const TWDT_TIMEOUT_MS: u32 = 10_000;

pub struct Watchdog {
    #[cfg(target_os = "espidf")]
    subscribed: bool,
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new()
    }
}

impl Watchdog {
    /// Initialise and subscribe the current task to the TWDT.
    pub fn new() -> Self {
        #[cfg(target_os = "espidf")]
        {
            unsafe {
                let cfg = esp_task_wdt_config_t {
                    timeout_ms: TWDT_TIMEOUT_MS,
                    idle_core_mask: 0,
                    trigger_panic: true,
                };
                let ret = esp_task_wdt_reconfigure(&cfg);
                if ret != ESP_OK {
                    log::warn!(
                        "TWDT reconfigure returned {} (may already be configured)",
                        ret
                    );
                }

                let ret = esp_task_wdt_add(core::ptr::null_mut());
                let subscribed = ret == ESP_OK;
                if subscribed {
                    info!(
                        "Watchdog: subscribed ({} s timeout, panic on trigger)",
                        TWDT_TIMEOUT_MS / 1000
                    );
                } else {
                    log::warn!("Watchdog: failed to subscribe ({})", ret);
                }

                Self { subscribed }
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            log::info!("Watchdog(sim): no-op");
            Self {}
        }
    }

    /// Feed the watchdog.
    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        {
            if self.subscribed {
                unsafe {
                    esp_task_wdt_reset();
                }
            }
        }
    }
}
