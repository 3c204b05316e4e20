//! Sensor drivers — battery voltage and the reed wake/sleep trigger.

pub mod battery;
pub mod reed;
