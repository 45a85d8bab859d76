//! Application-wide constants and compile-time configuration.
//!
//! All hardware pin assignments, timing parameters, and protocol
//! constants live here so they can be tuned in one place.

// BLE

/// GAP device name. The advertisement carries as much of it as fits.
pub const DEVICE_NAME: &str = "AMS Remote";

/// Advertising interval (in 0.625 ms units). 160 = 100 ms.
pub const BLE_ADV_INTERVAL: u32 = 160;

/// BLE connection interval range (in 1.25 ms units).
/// 24-40 = 30-50 ms, the range iOS accepts for accessories.
pub const BLE_CONN_INTERVAL_MIN: u16 = 24;
pub const BLE_CONN_INTERVAL_MAX: u16 = 40;

/// BLE slave latency (number of connection events the peripheral can skip).
pub const BLE_SLAVE_LATENCY: u16 = 0;

/// BLE supervision timeout (in 10 ms units). 400 = 4 s.
pub const BLE_SUP_TIMEOUT: u16 = 400;

/// How often and how long to poll for an encrypted link after pairing
/// was requested. 25 × 200 ms = 5 s.
pub const SECURE_LINK_POLLS: u32 = 25;
pub const SECURE_LINK_POLL_MS: u64 = 200;

/// ATT MTU requested from the phone. Notification and read payloads
/// are at most `ATT_MTU - 1` bytes and must fit `ams_gatt::VALUE_CAPACITY`.
pub const ATT_MTU: u16 = 128;

/// Maximum number of bonds kept in RAM. The oldest is evicted first.
pub const MAX_BONDS: usize = 4;

/// Back-off before advertising again after a failed session (ms).
pub const RECONNECT_BACKOFF_MS: u64 = 1000;

// GPIO pin assignments (nRF52840-DK defaults)
//
// These are logical names; actual `embassy_nrf::peripherals::*` types are
// selected in `main.rs`.  Adjust for your custom PCB.
//
//   Button PLAY/PAUSE → P0.11
//   Button NEXT       → P0.12
//   Button PREV       → P0.24
//   Button VOL+       → P0.25
//   Button VOL-       → P0.02
//   I²C SDA           → P0.26
//   I²C SCL           → P0.27

/// Button debounce time (ms).
pub const BUTTON_DEBOUNCE_MS: u64 = 50;

/// Depth of the button → BLE command channel.
pub const BUTTON_QUEUE_DEPTH: usize = 4;

// Display

/// Redraw cadence while something is playing (ms). Drives the elapsed
/// counter and title scrolling.
pub const DISPLAY_TICK_MS: u64 = 500;

/// Characters per line with the 6×10 font on a 128 px wide panel.
pub const DISPLAY_COLUMNS: usize = 21;
