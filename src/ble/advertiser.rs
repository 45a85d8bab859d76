//! BLE GAP advertiser - waits for the phone to connect.
//!
//! Uses the SoftDevice Peripheral-role advertising API with a bonding
//! security handler, so pairing can start as soon as the link is up.

use ams2oled::ams::SERVICE_UUID_BYTES;
use ams2oled::ble::adv_payload::build_advertisement;
use defmt::{info, warn};
use nrf_softdevice::ble::security::SecurityHandler;
use nrf_softdevice::ble::{peripheral, Connection};
use nrf_softdevice::Softdevice;

use crate::config::{BLE_ADV_INTERVAL, DEVICE_NAME};
use crate::error::BleError;

/// Advertise connectable + scannable until a central connects.
///
/// The advertisement solicits AMS; the scan response repeats the full
/// device name for scanners that ask.
pub async fn advertise(
    sd: &Softdevice,
    bonder: &'static dyn SecurityHandler,
) -> Result<Connection, BleError> {
    let adv_data = build_advertisement(&SERVICE_UUID_BYTES, DEVICE_NAME);

    let mut scan_data: heapless::Vec<u8, 31> = heapless::Vec::new();
    let name = DEVICE_NAME.as_bytes();
    let name_len = name.len().min(29);
    let _ = scan_data.push(name_len as u8 + 1);
    let _ = scan_data.push(ams2oled::ble::adv_payload::AD_TYPE_COMPLETE_NAME);
    let _ = scan_data.extend_from_slice(&name[..name_len]);

    let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
        adv_data: &adv_data,
        scan_data: &scan_data,
    };
    let config = peripheral::Config {
        interval: BLE_ADV_INTERVAL,
        ..Default::default()
    };

    info!("Advertising as {}", DEVICE_NAME);

    match peripheral::advertise_pairable(sd, adv, &config, bonder).await {
        Ok(conn) => {
            info!("Central connected");
            Ok(conn)
        }
        Err(e) => {
            warn!("Advertising ended with error: {}", e);
            Err(BleError::AdvertiseFailed)
        }
    }
}
