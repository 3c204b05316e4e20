//! GPIO / peripheral pin assignments for the Tappie main board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Rotary encoder (EC11, half-quadrature via PCNT)
// ---------------------------------------------------------------------------

/// Encoder phase A — PCNT edge input.
pub const ENCODER_A_GPIO: i32 = 32;
/// Encoder phase B — PCNT level input.  Input-only pin, external pull-up.
pub const ENCODER_B_GPIO: i32 = 35;
/// Encoder push switch, active LOW.  Input-only pin, external pull-up.
pub const ENCODER_SW_GPIO: i32 = 34;

// ---------------------------------------------------------------------------
// Media buttons (momentary, active LOW with internal pull-ups)
// ---------------------------------------------------------------------------

pub const BTN_MASTER_GPIO: i32 = 25;
pub const BTN_GAMING_GPIO: i32 = 26;
pub const BTN_AUX_GPIO: i32 = 27;
pub const BTN_MEDIA_GPIO: i32 = 14;
pub const BTN_CHAT_GPIO: i32 = 13;

// ---------------------------------------------------------------------------
// Reed switch (lid sensor)
// ---------------------------------------------------------------------------

/// Reed switch to ground, internal pull-up.  HIGH = magnet absent (awake),
/// LOW = magnet present (sleep).  RTC-capable pin — required for EXT0 wake.
pub const REED_GPIO: i32 = 33;

// ---------------------------------------------------------------------------
// Battery sense (ADC1)
// ---------------------------------------------------------------------------

/// LiPo cell voltage through a 2:1 resistive divider.
/// ADC1 channel 0 (GPIO 36, input-only).
pub const BATTERY_ADC_GPIO: i32 = 36;
/// ADC1 channel number for the battery divider.
pub const ADC1_CH_BATTERY: u32 = 0;
