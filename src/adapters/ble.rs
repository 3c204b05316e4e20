//! BLE GATT server adapter.
//!
//! Implements [`NotifyPort`] — the hexagonal boundary for pushing
//! characteristic notifications to the connected central.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: Bluedroid BLE GATT server via `esp_idf_svc::sys`.
//! - **all other targets**: simulation backend recording notifies for host tests.
//!
//! ## GATT Service Layout
//!
//! | Characteristic   | UUID                                    | Perms             |
//! |------------------|-----------------------------------------|-------------------|
//! | Encoder position | `a9c8c7b4-…-2c14b5812546`               | Read+Write+Notify |
//! | Encoder gesture  | `0c2f5fbe-…-ce0c9358e574`               | Read+Write+Notify |
//! | Media single     | `9ff67916-…-46d118b1e5eb`               | Read+Write+Notify |
//! | Media double     | `66f1ab02-…-5e8bdbb2fe80`               | Read+Write+Notify |
//!
//! Writes are accepted and logged but carry no behaviour — the protocol
//! is notification-only and the write permission exists for client
//! compatibility.
//!
//! The connect/disconnect callbacks only flip [`LINK_UP`]; every side
//! effect of a connection change (resync, re-advertise after the settle
//! delay) runs in main-loop context via
//! [`ConnectionSupervisor`](crate::app::connection::ConnectionSupervisor).

use core::sync::atomic::{AtomicBool, Ordering};

use log::info;

use crate::app::dispatcher::ChannelId;
use crate::app::ports::{NotifyError, NotifyPort};
use crate::error::BleError;

// ───────────────────────────────────────────────────────────────
// Constants
// ───────────────────────────────────────────────────────────────

pub const SERVICE_UUID: u128 = 0x738b66f1_91b7_4f25_8ab8_31d38d56541a;
pub const CHAR_ENCODER_POSITION: u128 = 0xa9c8c7b4_fb55_4d27_99e4_2c14b5812546;
pub const CHAR_ENCODER_GESTURE: u128 = 0x0c2f5fbe_c20f_49ec_8c7c_ce0c9358e574;
pub const CHAR_MEDIA_SINGLE: u128 = 0x9ff67916_665f_4489_b257_46d118b1e5eb;
pub const CHAR_MEDIA_DOUBLE: u128 = 0x66f1ab02_c93d_44fe_8ca9_5e8bdbb2fe80;

// ───────────────────────────────────────────────────────────────
// Link flag (written by callbacks, read by the main loop)
// ───────────────────────────────────────────────────────────────

static LINK_UP: AtomicBool = AtomicBool::new(false);

/// Live link state as last written by the Bluedroid callbacks.
pub fn link_up() -> bool {
    LINK_UP.load(Ordering::Acquire)
}

/// Flip the link flag directly (host tests).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_link_up(up: bool) {
    LINK_UP.store(up, Ordering::Release);
}

// ───────────────────────────────────────────────────────────────
// Simulation backend
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
static SIM_NOTIFIES: std::sync::Mutex<Vec<(ChannelId, String)>> = std::sync::Mutex::new(Vec::new());

/// Drain every notification recorded since the last call (host tests).
#[cfg(not(target_os = "espidf"))]
pub fn sim_take_notifies() -> Vec<(ChannelId, String)> {
    SIM_NOTIFIES
        .lock()
        .map(|mut v| core::mem::take(&mut *v))
        .unwrap_or_default()
}

// ── ESP-IDF BLE static state (callback-safe atomics) ──────────
//
// Bluedroid callbacks are C function pointers that cannot capture Rust
// closures.  These atomics bridge the callback context to the adapter.

#[cfg(target_os = "espidf")]
use core::sync::atomic::AtomicU32;

#[cfg(target_os = "espidf")]
static BLE_GATTS_IF: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_CONN_ID: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_SVC_HANDLE: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_CHAR_STEP: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_POSITION_CHAR_HANDLE: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_GESTURE_CHAR_HANDLE: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_MEDIA_SINGLE_CHAR_HANDLE: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_MEDIA_DOUBLE_CHAR_HANDLE: AtomicU32 = AtomicU32::new(0);

/// 128-bit service UUID in over-the-air byte order for advertising data.
#[cfg(target_os = "espidf")]
static ADV_SERVICE_UUID: [u8; 16] = SERVICE_UUID.to_le_bytes();

#[cfg(target_os = "espidf")]
fn uuid128_to_esp(uuid: u128) -> esp_idf_svc::sys::esp_bt_uuid_t {
    let mut t: esp_idf_svc::sys::esp_bt_uuid_t = unsafe { core::mem::zeroed() };
    t.len = 16;
    unsafe {
        t.uuid.uuid128 = uuid.to_le_bytes();
    }
    t
}

#[cfg(target_os = "espidf")]
unsafe fn add_gatt_char(svc_handle: u16, uuid: u128) {
    use esp_idf_svc::sys::*;
    let mut char_uuid = uuid128_to_esp(uuid);
    let perm = ESP_GATT_PERM_READ | ESP_GATT_PERM_WRITE;
    let prop =
        ESP_GATT_CHAR_PROP_BIT_READ | ESP_GATT_CHAR_PROP_BIT_WRITE | ESP_GATT_CHAR_PROP_BIT_NOTIFY;
    unsafe {
        esp_ble_gatts_add_char(
            svc_handle,
            &mut char_uuid,
            perm as esp_gatt_perm_t,
            prop as esp_gatt_char_prop_t,
            core::ptr::null_mut(),
            core::ptr::null_mut(),
        );
    }
}

/// Client Characteristic Configuration descriptor — required for the
/// central to enable notifications on the preceding characteristic.
#[cfg(target_os = "espidf")]
unsafe fn add_gatt_cccd(svc_handle: u16) {
    use esp_idf_svc::sys::*;
    let mut d: esp_bt_uuid_t = unsafe { core::mem::zeroed() };
    d.len = ESP_UUID_LEN_16 as u16;
    d.uuid.uuid16 = ESP_GATT_UUID_CHAR_CLIENT_CONFIG as u16;
    unsafe {
        esp_ble_gatts_add_char_descr(
            svc_handle,
            &mut d,
            (ESP_GATT_PERM_READ | ESP_GATT_PERM_WRITE) as esp_gatt_perm_t,
            core::ptr::null_mut(),
            core::ptr::null_mut(),
        );
    }
}

#[cfg(target_os = "espidf")]
unsafe fn start_advertising_raw() {
    use esp_idf_svc::sys::*;
    let mut adv_params = esp_ble_adv_params_t {
        adv_int_min: 0x20,
        adv_int_max: 0x40,
        adv_type: esp_ble_adv_type_t_ADV_TYPE_IND,
        own_addr_type: esp_ble_addr_type_t_BLE_ADDR_TYPE_PUBLIC,
        channel_map: esp_ble_adv_channel_t_ADV_CHNL_ALL,
        adv_filter_policy: esp_ble_adv_filter_t_ADV_FILTER_ALLOW_SCAN_ANY_CON_ANY,
        ..unsafe { core::mem::zeroed() }
    };
    unsafe {
        esp_ble_gap_start_advertising(&mut adv_params);
    }
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn ble_gap_event_handler(
    event: esp_idf_svc::sys::esp_gap_ble_cb_event_t,
    _param: *mut esp_idf_svc::sys::esp_ble_gap_cb_param_t,
) {
    use esp_idf_svc::sys::*;
    match event {
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_DATA_SET_COMPLETE_EVT => {
            // Advertising payload is in place — go visible.
            unsafe { start_advertising_raw() };
        }
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_START_COMPLETE_EVT => {
            log::info!("BLE GAP: advertising started");
        }
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_STOP_COMPLETE_EVT => {
            log::info!("BLE GAP: advertising stopped");
        }
        _ => {}
    }
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn ble_gatts_event_handler(
    event: esp_idf_svc::sys::esp_gatts_cb_event_t,
    gatts_if: esp_idf_svc::sys::esp_gatt_if_t,
    param: *mut esp_idf_svc::sys::esp_ble_gatts_cb_param_t,
) {
    use esp_idf_svc::sys::*;

    BLE_GATTS_IF.store(u32::from(gatts_if), Ordering::Relaxed);

    match event {
        esp_gatts_cb_event_t_ESP_GATTS_REG_EVT => {
            log::info!("BLE GATTS: app registered (if={})", gatts_if);
            let svc_uuid = uuid128_to_esp(SERVICE_UUID);
            let mut svc_id = esp_gatt_srvc_id_t {
                id: esp_gatt_id_t {
                    uuid: svc_uuid,
                    inst_id: 0,
                },
                is_primary: true,
            };
            // 1 service + 4 × (declaration + value + CCCD) = 13 handles.
            unsafe { esp_ble_gatts_create_service(gatts_if, &mut svc_id, 16) };
        }
        esp_gatts_cb_event_t_ESP_GATTS_CREATE_EVT => {
            let p = unsafe { &(*param).create };
            let svc_handle = p.service_handle;
            BLE_SVC_HANDLE.store(u32::from(svc_handle), Ordering::Relaxed);
            log::info!("BLE GATTS: service created (handle={})", svc_handle);
            unsafe { esp_ble_gatts_start_service(svc_handle) };
            BLE_CHAR_STEP.store(1, Ordering::Relaxed);
            unsafe { add_gatt_char(svc_handle, CHAR_ENCODER_POSITION) };
        }
        esp_gatts_cb_event_t_ESP_GATTS_ADD_CHAR_EVT => {
            let p = unsafe { &(*param).add_char };
            let handle = u32::from(p.attr_handle);
            let svc_handle = BLE_SVC_HANDLE.load(Ordering::Relaxed) as u16;
            match BLE_CHAR_STEP.load(Ordering::Relaxed) {
                1 => {
                    BLE_POSITION_CHAR_HANDLE.store(handle, Ordering::Relaxed);
                    log::info!("BLE GATTS: position char (handle={})", handle);
                }
                2 => {
                    BLE_GESTURE_CHAR_HANDLE.store(handle, Ordering::Relaxed);
                    log::info!("BLE GATTS: gesture char (handle={})", handle);
                }
                3 => {
                    BLE_MEDIA_SINGLE_CHAR_HANDLE.store(handle, Ordering::Relaxed);
                    log::info!("BLE GATTS: media-single char (handle={})", handle);
                }
                4 => {
                    BLE_MEDIA_DOUBLE_CHAR_HANDLE.store(handle, Ordering::Relaxed);
                    log::info!("BLE GATTS: media-double char (handle={})", handle);
                }
                _ => {}
            }
            // Every characteristic gets a CCCD; the next char is queued
            // from the descriptor-added event.
            unsafe { add_gatt_cccd(svc_handle) };
        }
        esp_gatts_cb_event_t_ESP_GATTS_ADD_CHAR_DESCR_EVT => {
            let svc_handle = BLE_SVC_HANDLE.load(Ordering::Relaxed) as u16;
            let step = BLE_CHAR_STEP.load(Ordering::Relaxed);
            BLE_CHAR_STEP.store(step + 1, Ordering::Relaxed);
            match step {
                1 => unsafe { add_gatt_char(svc_handle, CHAR_ENCODER_GESTURE) },
                2 => unsafe { add_gatt_char(svc_handle, CHAR_MEDIA_SINGLE) },
                3 => unsafe { add_gatt_char(svc_handle, CHAR_MEDIA_DOUBLE) },
                4 => log::info!("BLE GATTS: all characteristics registered"),
                _ => {}
            }
        }
        esp_gatts_cb_event_t_ESP_GATTS_CONNECT_EVT => {
            let p = unsafe { &(*param).connect };
            BLE_CONN_ID.store(u32::from(p.conn_id), Ordering::Relaxed);
            LINK_UP.store(true, Ordering::Release);
            log::info!("BLE GATTS: central connected (conn_id={})", p.conn_id);
        }
        esp_gatts_cb_event_t_ESP_GATTS_DISCONNECT_EVT => {
            LINK_UP.store(false, Ordering::Release);
            log::info!("BLE GATTS: central disconnected");
            // No re-advertise here — the main loop restarts advertising
            // after the settle delay.
        }
        esp_gatts_cb_event_t_ESP_GATTS_WRITE_EVT => {
            let p = unsafe { &(*param).write };
            // Writes carry no behaviour in this protocol.
            log::info!(
                "BLE GATTS: write to handle {} ({} bytes) accepted and ignored",
                p.handle,
                p.len
            );
        }
        _ => {}
    }
}

#[cfg(target_os = "espidf")]
fn char_handle(channel: ChannelId) -> u32 {
    match channel {
        ChannelId::EncoderPosition => BLE_POSITION_CHAR_HANDLE.load(Ordering::Relaxed),
        ChannelId::EncoderGesture => BLE_GESTURE_CHAR_HANDLE.load(Ordering::Relaxed),
        ChannelId::MediaSingle => BLE_MEDIA_SINGLE_CHAR_HANDLE.load(Ordering::Relaxed),
        ChannelId::MediaDouble => BLE_MEDIA_DOUBLE_CHAR_HANDLE.load(Ordering::Relaxed),
    }
}

// ───────────────────────────────────────────────────────────────
// BLE adapter
// ───────────────────────────────────────────────────────────────

pub struct BleAdapter {
    device_name: heapless::String<24>,
    /// Preferred connection interval carried in advertising data
    /// (1.25 ms slots).
    conn_min_slots: u16,
    conn_max_slots: u16,
    active: bool,
}

impl BleAdapter {
    pub fn new(
        device_name: heapless::String<24>,
        conn_min_slots: u16,
        conn_max_slots: u16,
    ) -> Self {
        Self {
            device_name,
            conn_min_slots,
            conn_max_slots,
            active: false,
        }
    }

    /// Stack is up and either advertising or connected.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Bring up the stack, register the GATT service, and start
    /// advertising.
    pub fn start(&mut self) -> Result<(), BleError> {
        info!("BLE: starting, advertising as '{}'", self.device_name);
        self.platform_start()?;
        self.active = true;
        Ok(())
    }

    /// Tear the stack down (sleep entry).  Any connected central is
    /// dropped with the transport.
    pub fn stop(&mut self) {
        self.platform_stop();
        LINK_UP.store(false, Ordering::Release);
        self.active = false;
        info!("BLE: stopped");
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_start(&mut self) -> Result<(), BleError> {
        use esp_idf_svc::sys::*;
        unsafe {
            // Release classic BT memory (BLE-only mode saves ~30 KB).
            esp_bt_controller_mem_release(esp_bt_mode_t_ESP_BT_MODE_CLASSIC_BT);

            let mut bt_cfg = esp_bt_controller_config_t::default();
            let ret = esp_bt_controller_init(&mut bt_cfg);
            if ret != ESP_OK {
                return Err(BleError::ControllerInit(ret));
            }

            let ret = esp_bt_controller_enable(esp_bt_mode_t_ESP_BT_MODE_BLE);
            if ret != ESP_OK {
                return Err(BleError::ControllerInit(ret));
            }

            let ret = esp_bluedroid_init();
            if ret != ESP_OK {
                return Err(BleError::StackInit(ret));
            }

            let ret = esp_bluedroid_enable();
            if ret != ESP_OK {
                return Err(BleError::StackInit(ret));
            }

            esp_ble_gap_register_callback(Some(ble_gap_event_handler));
            esp_ble_gatts_register_callback(Some(ble_gatts_event_handler));
            let ret = esp_ble_gatts_app_register(0);
            if ret != ESP_OK {
                return Err(BleError::AppRegister(ret));
            }

            let name = self.device_name.as_bytes();
            esp_ble_gap_set_device_name(name.as_ptr().cast());

            // The 128-bit UUID plus the interval range fills the 31-byte
            // advertising payload; the device name rides in the scan
            // response instead.
            let mut adv_data = esp_ble_adv_data_t {
                set_scan_rsp: false,
                include_name: false,
                include_txpower: false,
                min_interval: i32::from(self.conn_min_slots),
                max_interval: i32::from(self.conn_max_slots),
                service_uuid_len: ADV_SERVICE_UUID.len() as u16,
                p_service_uuid: ADV_SERVICE_UUID.as_ptr().cast_mut(),
                flag: (ESP_BLE_ADV_FLAG_GEN_DISC | ESP_BLE_ADV_FLAG_BREDR_NOT_SPT) as u8,
                ..core::mem::zeroed()
            };
            esp_ble_gap_config_adv_data(&mut adv_data);

            let mut scan_rsp = esp_ble_adv_data_t {
                set_scan_rsp: true,
                include_name: true,
                ..core::mem::zeroed()
            };
            esp_ble_gap_config_adv_data(&mut scan_rsp);

            // Advertising itself starts from the GAP callback once the
            // payload is committed.
            info!(
                "BLE(espidf): Bluedroid stack initialized (conn interval {}..{} slots)",
                self.conn_min_slots, self.conn_max_slots
            );
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_start(&mut self) -> Result<(), BleError> {
        info!(
            "BLE(sim): advertising '{}' (service {:032x}, conn interval {}..{} slots)",
            self.device_name, SERVICE_UUID, self.conn_min_slots, self.conn_max_slots
        );
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_stop(&mut self) {
        use esp_idf_svc::sys::*;
        unsafe {
            esp_ble_gap_stop_advertising();
            esp_bluedroid_disable();
            esp_bluedroid_deinit();
            esp_bt_controller_disable();
            esp_bt_controller_deinit();
        }
        info!("BLE(espidf): stack shut down");
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_stop(&mut self) {
        info!("BLE(sim): stopped");
    }

    /// Re-arm advertising after a disconnect.  Called from the main loop
    /// once the settle delay has elapsed.
    #[cfg(target_os = "espidf")]
    pub fn start_advertising(&mut self) {
        // SAFETY: advertising parameters were committed during start();
        // re-arming is a plain GAP call from main-loop context.
        unsafe { start_advertising_raw() };
        info!("BLE: advertising re-armed");
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn start_advertising(&mut self) {
        info!("BLE(sim): advertising re-armed");
    }

    /// Drop the connected central, if any (sleep entry).
    #[cfg(target_os = "espidf")]
    pub fn force_disconnect(&mut self) {
        use esp_idf_svc::sys::*;
        if !link_up() {
            return;
        }
        let gatts_if = BLE_GATTS_IF.load(Ordering::Relaxed) as u8;
        let conn_id = BLE_CONN_ID.load(Ordering::Relaxed) as u16;
        // SAFETY: handles were stored by the registration callbacks.
        unsafe {
            esp_ble_gatts_close(gatts_if, conn_id);
        }
        LINK_UP.store(false, Ordering::Release);
        info!("BLE: central force-disconnected");
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn force_disconnect(&mut self) {
        if link_up() {
            LINK_UP.store(false, Ordering::Release);
            info!("BLE(sim): central force-disconnected");
        }
    }
}

// ───────────────────────────────────────────────────────────────
// NotifyPort implementation
// ───────────────────────────────────────────────────────────────

impl NotifyPort for BleAdapter {
    #[cfg(target_os = "espidf")]
    fn notify(&mut self, channel: ChannelId, payload: &str) -> Result<(), NotifyError> {
        use esp_idf_svc::sys::*;
        let handle = char_handle(channel);
        if handle == 0 {
            return Err(NotifyError::ChannelNotReady);
        }
        if !link_up() {
            return Err(NotifyError::NotConnected);
        }
        let gatts_if = BLE_GATTS_IF.load(Ordering::Relaxed) as u8;
        let conn_id = BLE_CONN_ID.load(Ordering::Relaxed) as u16;
        // SAFETY: send_indicate copies the payload before returning;
        // need_confirm=false makes this a notification, not an indication.
        let ret = unsafe {
            esp_ble_gatts_send_indicate(
                gatts_if,
                conn_id,
                handle as u16,
                payload.len() as u16,
                payload.as_ptr().cast_mut(),
                false,
            )
        };
        if ret != ESP_OK {
            return Err(NotifyError::Transport(ret));
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn notify(&mut self, channel: ChannelId, payload: &str) -> Result<(), NotifyError> {
        if !link_up() {
            return Err(NotifyError::NotConnected);
        }
        if let Ok(mut v) = SIM_NOTIFIES.lock() {
            v.push((channel, payload.to_string()));
        }
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
