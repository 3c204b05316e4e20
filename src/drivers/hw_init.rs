//! One-shot hardware peripheral initialization.
//!
//! Configures GPIO inputs, the battery ADC channel, and the PCNT unit
//! for the rotary encoder using raw ESP-IDF sys calls.  Called once from
//! `main()` before the polling loop starts.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
    PcntInitFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::PcntInitFailed(rc) => write!(f, "PCNT unit config failed (rc={})", rc),
        }
    }
}

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the polling loop; single-threaded.
    unsafe {
        init_gpio_inputs()?;
        init_adc()?;
        init_pcnt()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── GPIO Inputs ───────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_inputs() -> Result<(), HwInitError> {
    // Media buttons and the reed switch use the internal pull-ups.
    let pulled_pins = [
        pins::BTN_MASTER_GPIO,
        pins::BTN_GAMING_GPIO,
        pins::BTN_AUX_GPIO,
        pins::BTN_MEDIA_GPIO,
        pins::BTN_CHAT_GPIO,
        pins::REED_GPIO,
    ];

    for &pin in &pulled_pins {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
    }

    // The encoder switch sits on an input-only pin: no internal pull-up,
    // the board carries an external one.
    let sw_cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::ENCODER_SW_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&sw_cfg) };
    if ret != ESP_OK {
        return Err(HwInitError::GpioConfigFailed(ret));
    }

    info!("hw_init: GPIO inputs configured");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: gpio_get_level is a read-only register access on an
    // already-configured input pin; safe to call from main context.
    (unsafe { gpio_get_level(pin) }) != 0
}

/// Host stub: pull-up resting level (buttons released, reed awake).
#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(_pin: i32) -> bool {
    true
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// main-loop ADC read path.  No concurrent access is possible because
/// `init_adc()` completes before the polling loop starts.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };

    let ret =
        unsafe { adc_oneshot_config_channel(adc1_handle(), pins::ADC1_CH_BATTERY, &chan_cfg) };
    if ret != ESP_OK {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    info!(
        "hw_init: ADC1 configured (CH{}=battery)",
        pins::ADC1_CH_BATTERY
    );
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract — single-threaded main-loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK {
        return 0;
    }
    raw.max(0) as u16
}

#[cfg(not(target_os = "espidf"))]
pub fn adc1_read(_channel: u32) -> u16 {
    0
}

// ── PCNT (encoder counter) ────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_pcnt() -> Result<(), HwInitError> {
    // Half-quadrature: count both edges of phase A, direction from the
    // level of phase B.  Two counts per mechanical detent.
    let cfg = pcnt_config_t {
        pulse_gpio_num: pins::ENCODER_A_GPIO,
        ctrl_gpio_num: pins::ENCODER_B_GPIO,
        pos_mode: pcnt_count_mode_t_PCNT_COUNT_INC,
        neg_mode: pcnt_count_mode_t_PCNT_COUNT_DEC,
        lctrl_mode: pcnt_ctrl_mode_t_PCNT_MODE_REVERSE,
        hctrl_mode: pcnt_ctrl_mode_t_PCNT_MODE_KEEP,
        counter_h_lim: i16::MAX,
        counter_l_lim: i16::MIN,
        unit: pcnt_unit_t_PCNT_UNIT_0,
        channel: pcnt_channel_t_PCNT_CHANNEL_0,
    };
    let ret = unsafe { pcnt_unit_config(&cfg) };
    if ret != ESP_OK {
        return Err(HwInitError::PcntInitFailed(ret));
    }

    // Hardware glitch filter: pulses shorter than 1000 APB cycles
    // (~12.5 us) are contact noise, not rotation.
    unsafe {
        pcnt_set_filter_value(pcnt_unit_t_PCNT_UNIT_0, 1000);
        pcnt_filter_enable(pcnt_unit_t_PCNT_UNIT_0);

        pcnt_counter_pause(pcnt_unit_t_PCNT_UNIT_0);
        pcnt_counter_clear(pcnt_unit_t_PCNT_UNIT_0);
        pcnt_counter_resume(pcnt_unit_t_PCNT_UNIT_0);
    }

    info!(
        "hw_init: PCNT unit 0 configured (A=GPIO{}, B=GPIO{})",
        pins::ENCODER_A_GPIO,
        pins::ENCODER_B_GPIO
    );
    Ok(())
}
