//! Bluetooth Low Energy subsystem.
//!
//! This module drives the Nordic SoftDevice S140 in **Peripheral** role
//! with a GATT client on top:
//!
//! 1. **Advertiser** - advertises with an AMS solicitation so the phone
//!    connects and offers its media service.
//! 2. **Connection** - bonds, waits for an encrypted link, then runs one
//!    AMS session until the link drops.
//! 3. **AMS GATT** - binds the discovered AMS characteristics to the
//!    protocol client and pumps notifications into the shared store.
//! 4. **CTS client** - reads the phone's clock once per connection.
//!
//! Pure payload/decoding helpers live in the library (`ams2oled::ble`).
//! Communication with other tasks is done via Embassy channels defined
//! in `main.rs`.

pub mod advertiser;
pub mod ams_gatt;
pub mod connection;
pub mod cts_client;

use defmt::Format;

/// Events the BLE task publishes for the UI.
#[derive(Clone, Copy, Format)]
pub enum BleEvent {
    /// Advertising started, waiting for the phone.
    Advertising,
    /// Link is up and encrypted; discovery in progress.
    Connected,
    /// Connection lost or intentionally closed.
    Disconnected,
    /// An error occurred (human-readable tag).
    Error(BleErrorTag),
}

/// Lightweight error tag for UI display (no dynamic alloc).
#[derive(Clone, Copy, Format)]
pub enum BleErrorTag {
    AdvertiseFailed,
    SecurityFailed,
    DiscoveryFailed,
    AmsNotFound,
    SubscribeFailed,
}

impl BleErrorTag {
    /// Short message for the error screen.
    pub fn message(self) -> &'static str {
        match self {
            BleErrorTag::AdvertiseFailed => "Advertising failed",
            BleErrorTag::SecurityFailed => "Pairing failed",
            BleErrorTag::DiscoveryFailed => "Discovery failed",
            BleErrorTag::AmsNotFound => "No media service",
            BleErrorTag::SubscribeFailed => "Subscribe failed",
        }
    }
}
