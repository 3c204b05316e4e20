//! LiPo battery sampler.
//!
//! The cell voltage reaches the ADC through a 2:1 resistive divider on
//! GPIO 36 (ADC1_CH0).  Samples are taken on a fixed interval and cached;
//! the cached percentage is what gets appended to outgoing position
//! payloads, so a notify never waits on an ADC conversion.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1 via the oneshot API (initialised by hw_init).
//! On host/test: reads from a static `AtomicU16` for injection.

use core::sync::atomic::AtomicU16;
#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::Ordering;

use log::warn;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
#[cfg(target_os = "espidf")]
use crate::pins;

/// Default raw value ≈ 3.76 V at the cell (about half charge).
static SIM_BATTERY_ADC: AtomicU16 = AtomicU16::new(2333);

/// Inject a raw ADC reading (host tests).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_battery_adc(raw: u16) {
    SIM_BATTERY_ADC.store(raw, Ordering::Relaxed);
}

const ADC_MAX_MV: u32 = 3300;
const ADC_MAX_RAW: u32 = 4095;
const DIVIDER_RATIO: u32 = 2;
/// LiPo discharge floor — mapped to 0 %.
const CELL_EMPTY_MV: u32 = 3300;
/// LiPo full charge — mapped to 100 %.
const CELL_FULL_MV: u32 = 4200;

/// Convert a raw 12-bit ADC reading into a clamped 0–100 percentage.
pub fn raw_to_percent(raw: u16) -> u8 {
    let pin_mv = u32::from(raw) * ADC_MAX_MV / ADC_MAX_RAW;
    let cell_mv = pin_mv * DIVIDER_RATIO;
    let clamped = cell_mv.clamp(CELL_EMPTY_MV, CELL_FULL_MV);
    ((clamped - CELL_EMPTY_MV) * 100 / (CELL_FULL_MV - CELL_EMPTY_MV)) as u8
}

pub struct BatterySampler {
    sample_interval_ms: u32,
    low_threshold_percent: u8,
    last_sample_ms: u32,
    percent: u8,
    /// Advisory already fired for the current below-threshold excursion.
    low_reported: bool,
}

impl BatterySampler {
    /// Takes an immediate first sample so `percent()` is valid from boot.
    pub fn new(sample_interval_ms: u32, low_threshold_percent: u8, now_ms: u32) -> Self {
        let mut s = Self {
            sample_interval_ms,
            low_threshold_percent,
            last_sample_ms: now_ms,
            percent: 0,
            low_reported: false,
        };
        s.percent = raw_to_percent(s.read_adc());
        s
    }

    /// Most recent cached percentage.
    pub fn percent(&self) -> u8 {
        self.percent
    }

    /// Resample when the interval has elapsed.  Returns the percentage
    /// once per downward crossing of the low-battery threshold.
    pub fn tick(&mut self, now_ms: u32) -> Option<u8> {
        if now_ms.wrapping_sub(self.last_sample_ms) < self.sample_interval_ms {
            return None;
        }
        self.last_sample_ms = now_ms;
        self.percent = raw_to_percent(self.read_adc());

        if self.percent < self.low_threshold_percent {
            if !self.low_reported {
                self.low_reported = true;
                warn!("battery: low ({}%)", self.percent);
                return Some(self.percent);
            }
        } else {
            self.low_reported = false;
        }
        None
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        hw_init::adc1_read(pins::ADC1_CH_BATTERY)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        SIM_BATTERY_ADC.load(Ordering::Relaxed)
    }
}
