//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements | Connects to              |
//! |------------|------------|--------------------------|
//! | `ble`      | NotifyPort | Bluedroid GATT server    |
//! | `log_sink` | EventSink  | Serial log output        |
//! | `time`     | —          | ESP32 system timer       |

pub mod ble;
pub mod log_sink;
pub mod time;
