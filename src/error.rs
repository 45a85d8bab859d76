//! Unified error type for the ams2oled firmware.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.

use ams2oled::ams::SetupError;
use defmt::Format;

use crate::ble::BleErrorTag;

/// Top-level error type for one connection's lifetime.
#[derive(Debug, Format)]
pub enum Error {
    // BLE
    /// The SoftDevice returned a BLE-level error.
    Ble(BleError),

    /// The phone does not expose the Apple Media Service.
    AmsServiceNotFound,

    /// AMS subscription setup failed.
    AmsSetup(SetupError),
}

impl Error {
    /// Tag shown on the display.
    pub fn tag(&self) -> BleErrorTag {
        match self {
            Error::Ble(BleError::AdvertiseFailed) => BleErrorTag::AdvertiseFailed,
            Error::Ble(BleError::SecurityFailed) => BleErrorTag::SecurityFailed,
            Error::Ble(_) => BleErrorTag::DiscoveryFailed,
            Error::AmsServiceNotFound => BleErrorTag::AmsNotFound,
            Error::AmsSetup(_) => BleErrorTag::SubscribeFailed,
        }
    }
}

/// Subset of BLE errors we propagate (keeps the enum `Copy`-friendly).
#[derive(Debug, Clone, Copy, Format)]
pub enum BleError {
    /// Advertising could not start or was cancelled.
    AdvertiseFailed,
    /// Pairing or encryption did not complete in time.
    SecurityFailed,
    /// GATT discovery failed.
    DiscoveryFailed,
}

// Convenience conversions

impl From<BleError> for Error {
    fn from(e: BleError) -> Self {
        Error::Ble(e)
    }
}

impl From<SetupError> for Error {
    fn from(e: SetupError) -> Self {
        Error::AmsSetup(e)
    }
}
