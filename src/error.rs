//! Unified error types for the Tappie firmware.
//!
//! A single `Error` enum that every fallible init path can convert into,
//! keeping the top-level bootstrap error handling uniform.  All variants are
//! `Copy` so they can be logged and passed around without allocation.
//! Steady-state operation does not produce errors — notify delivery is
//! guarded by connection state, and transport failures are logged and
//! dropped at the port boundary.

use core::fmt;

use crate::drivers::hw_init::HwInitError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The BLE stack could not be brought up or torn down.
    Ble(BleError),
    /// Peripheral initialisation failed.
    HwInit(HwInitError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ble(e) => write!(f, "ble: {e}"),
            Self::HwInit(e) => write!(f, "hw init: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// BLE stack lifecycle errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BleError {
    /// Bluetooth controller init/enable failed.
    ControllerInit(i32),
    /// Bluedroid host stack init/enable failed.
    StackInit(i32),
    /// GATTS application registration failed.
    AppRegister(i32),
}

impl fmt::Display for BleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ControllerInit(rc) => write!(f, "controller init failed (rc={rc})"),
            Self::StackInit(rc) => write!(f, "host stack init failed (rc={rc})"),
            Self::AppRegister(rc) => write!(f, "GATTS app register failed (rc={rc})"),
        }
    }
}

impl From<BleError> for Error {
    fn from(e: BleError) -> Self {
        Self::Ble(e)
    }
}

impl From<HwInitError> for Error {
    fn from(e: HwInitError) -> Self {
        Self::HwInit(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
