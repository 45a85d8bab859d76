//! BLE GATT Current Time client.
//!
//! iOS exposes CTS to bonded accessories. The time is read once per
//! connection; the UI advances it locally from the read instant.

use ams2oled::ble::current_time::{CurrentTime, CURRENT_TIME_LEN};
use defmt::{info, warn};
use embassy_time::Instant;
use heapless::Vec;
use nrf_softdevice::ble::{gatt_client, Connection};

#[nrf_softdevice::gatt_client(uuid = "1805")]
pub struct CtsServiceClient {
    /// Current Time - 10-byte exact time + adjust reason.
    #[characteristic(uuid = "2a2b", read, notify)]
    pub current_time: Vec<u8, CURRENT_TIME_LEN>,
}

/// A decoded clock reading and when it was taken.
#[derive(Clone, Copy)]
pub struct ClockSample {
    pub time: CurrentTime,
    pub taken_at: Instant,
}

impl ClockSample {
    /// Seconds since midnight, advanced to `now`.
    pub fn seconds_of_day_at(&self, now: Instant) -> u32 {
        let elapsed = now.saturating_duration_since(self.taken_at).as_secs() as u32;
        self.time.seconds_of_day().wrapping_add(elapsed)
    }
}

/// Discover CTS and read the phone's clock. `None` when the phone does
/// not offer the service or the value is malformed.
pub async fn read_clock(conn: &Connection) -> Option<ClockSample> {
    let client: CtsServiceClient = match gatt_client::discover(conn).await {
        Ok(client) => client,
        Err(_) => {
            info!("Phone has no Current Time Service");
            return None;
        }
    };

    let raw = match client.current_time_read().await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Current Time read failed: {}", e);
            return None;
        }
    };

    let Some(time) = CurrentTime::from_ble_bytes(&raw) else {
        warn!("Malformed Current Time value ({} bytes)", raw.len());
        return None;
    };

    info!(
        "Phone clock {:02}:{:02}:{:02} {}",
        time.hours,
        time.minutes,
        time.seconds,
        time.weekday_name()
    );
    Some(ClockSample {
        time,
        taken_at: Instant::now(),
    })
}
