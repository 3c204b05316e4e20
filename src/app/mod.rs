//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the business rules for the Tappie controller:
//! position tracking, notification channel semantics, and connection
//! supervision.  All interaction with hardware happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod connection;
pub mod dispatcher;
pub mod events;
pub mod ports;
pub mod tracker;
