//! BLE GATT AMS client - binds the phone's Apple Media Service to the
//! protocol client in the library.
//!
//! After the link is encrypted, this module:
//! 1. Discovers the AMS service and its three characteristics.
//! 2. Hands them to `AmsClient::start`, which enables notifications and
//!    writes the entity subscriptions.
//! 3. Pumps notifications into the shared `MediaStore` while sending
//!    button commands, until the link drops.

use ams2oled::ams::{
    AmsCharacteristic, AmsClient, AmsTransport, ChangeFlags, GattError, MediaSnapshot, MediaStore,
};
use ams2oled::ui::media_controls::command_for;
use ams2oled::ui::ButtonEvent;
use defmt::{debug, info, warn};
use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Receiver;
use embassy_sync::signal::Signal;
use heapless::Vec;
use nrf_softdevice::ble::gatt_client::{self, ReadError, WriteError};
use nrf_softdevice::ble::Connection;

use crate::config::{self, BUTTON_QUEUE_DEPTH};
use crate::error::{BleError, Error};

/// Largest characteristic value we accept. Notifications and single
/// reads are both bounded by the ATT MTU.
pub const VALUE_CAPACITY: usize = config::ATT_MTU as usize;

pub type Value = Vec<u8, VALUE_CAPACITY>;

/// nrf-softdevice GATT client struct for the Apple Media Service.
///
/// The `#[nrf_softdevice::gatt_client]` macro generates discovery and
/// read/write/notify helpers for the listed characteristics. Discovery
/// fails unless all three are present.
#[nrf_softdevice::gatt_client(uuid = "89d3502b-0f36-433a-8ef4-c502ad55f8dc")]
pub struct AmsServiceClient {
    /// Remote Command - commands out, availability lists in.
    #[characteristic(uuid = "9b3c81d8-57b1-4a8a-b8df-0e56f7ca51c2", write, notify)]
    pub remote_command: Value,

    /// Entity Update - subscriptions out, attribute updates in.
    #[characteristic(uuid = "2f7cabce-808d-411f-9a0c-bb92ba96c102", write, notify)]
    pub entity_update: Value,

    /// Entity Attribute - full values of truncated attributes.
    #[characteristic(uuid = "c6b2f38c-23ab-46d8-a6ab-a3a870bbd5d7", read, write)]
    pub entity_attribute: Value,
}

/// `AmsTransport` over a discovered `AmsServiceClient`.
pub struct SoftdeviceAms<'a> {
    client: &'a AmsServiceClient,
}

impl<'a> SoftdeviceAms<'a> {
    pub fn new(client: &'a AmsServiceClient) -> Self {
        Self { client }
    }
}

/// ATT application errors (0xA0..) arrive as GATT status 0x01xx.
fn att_code(status: nrf_softdevice::ble::GattError) -> u8 {
    (u16::from(status) & 0xFF) as u8
}

fn map_write_error(e: WriteError) -> GattError {
    match e {
        WriteError::Disconnected => GattError::Disconnected,
        WriteError::Gatt(status) => GattError::Att(att_code(status)),
        _ => GattError::Rejected,
    }
}

fn map_read_error(e: ReadError) -> GattError {
    match e {
        ReadError::Disconnected => GattError::Disconnected,
        ReadError::Gatt(status) => GattError::Att(att_code(status)),
        _ => GattError::Rejected,
    }
}

fn to_value(data: &[u8]) -> Result<Value, GattError> {
    Vec::from_slice(data).map_err(|_| GattError::Rejected)
}

impl AmsTransport for SoftdeviceAms<'_> {
    fn has_characteristic(&self, _characteristic: AmsCharacteristic) -> bool {
        // `gatt_client::discover` only succeeds with every handle resolved.
        true
    }

    async fn set_notifications(
        &self,
        characteristic: AmsCharacteristic,
        enabled: bool,
    ) -> Result<(), GattError> {
        let result = match characteristic {
            AmsCharacteristic::RemoteCommand => {
                self.client.remote_command_cccd_write(enabled).await
            }
            AmsCharacteristic::EntityUpdate => self.client.entity_update_cccd_write(enabled).await,
            AmsCharacteristic::EntityAttribute => return Err(GattError::Rejected),
        };
        result.map_err(map_write_error)
    }

    async fn write(&self, characteristic: AmsCharacteristic, data: &[u8]) -> Result<(), GattError> {
        let value = to_value(data)?;
        let result = match characteristic {
            AmsCharacteristic::RemoteCommand => self.client.remote_command_write(&value).await,
            AmsCharacteristic::EntityUpdate => self.client.entity_update_write(&value).await,
            AmsCharacteristic::EntityAttribute => self.client.entity_attribute_write(&value).await,
        };
        result.map_err(map_write_error)
    }

    async fn read(
        &self,
        characteristic: AmsCharacteristic,
        buf: &mut [u8],
    ) -> Result<usize, GattError> {
        if characteristic != AmsCharacteristic::EntityAttribute {
            return Err(GattError::Rejected);
        }
        let value = self
            .client
            .entity_attribute_read()
            .await
            .map_err(map_read_error)?;
        let len = value.len().min(buf.len());
        buf[..len].copy_from_slice(&value[..len]);
        Ok(len)
    }
}

/// Discover the AMS service on the connected phone.
pub async fn discover(conn: &Connection) -> Result<AmsServiceClient, Error> {
    info!("Discovering AMS service...");
    let client: AmsServiceClient = gatt_client::discover(conn).await.map_err(|e| match e {
        gatt_client::DiscoverError::ServiceNotFound => Error::AmsServiceNotFound,
        _ => Error::Ble(BleError::DiscoveryFailed),
    })?;
    info!("AMS service discovered");
    Ok(client)
}

/// Run one AMS session until the link drops.
///
/// Notifications go straight into `store`; `redraw` is raised whenever a
/// change flag is set. Button presses are mapped to the best command the
/// phone currently accepts. Truncated track text is re-fetched in full.
pub async fn run_session(
    conn: &Connection,
    client: &AmsServiceClient,
    store: &'static MediaStore<CriticalSectionRawMutex>,
    buttons: &Receiver<'static, CriticalSectionRawMutex, ButtonEvent, BUTTON_QUEUE_DEPTH>,
    redraw: &'static Signal<CriticalSectionRawMutex, ()>,
) -> Result<(), Error> {
    let ams = AmsClient::start(store, SoftdeviceAms::new(client)).await?;
    // Presses from before the session have nothing to act on.
    while buttons.try_receive().is_ok() {}
    redraw.signal(());
    // Wakes the command loop; the client holds the queue itself.
    let refetch: Signal<CriticalSectionRawMutex, ()> = Signal::new();
    let mut notify_ui = |_: &MediaSnapshot, _: ChangeFlags| redraw.signal(());

    let notifications = gatt_client::run(conn, client, |event| {
        let (source, data) = match &event {
            AmsServiceClientEvent::RemoteCommandNotification(data) => {
                (AmsCharacteristic::RemoteCommand, data)
            }
            AmsServiceClientEvent::EntityUpdateNotification(data) => {
                (AmsCharacteristic::EntityUpdate, data)
            }
        };

        ams.on_notification(source, data, &mut notify_ui);
        if ams.has_pending_refetch() {
            refetch.signal(());
        }
    });

    let commands = async {
        loop {
            match select(buttons.receive(), refetch.wait()).await {
                Either::First(button) => {
                    send_for_button(&ams, button).await;
                }
                Either::Second(()) => {
                    let mut sink = |_: &MediaSnapshot, _: ChangeFlags| redraw.signal(());
                    while let Some(attribute) = ams.next_refetch() {
                        if let Err(e) = ams.refresh_attribute(attribute, &mut sink).await {
                            debug!("Attribute refresh failed: {}", e);
                        }
                    }
                }
            }
        }
    };

    // The command loop never finishes; the session ends with the link.
    select(notifications, commands).await;
    info!("AMS session ended (connection closed)");
    ams.disconnect();
    redraw.signal(());
    Ok(())
}

async fn send_for_button<T: AmsTransport>(
    ams: &AmsClient<'static, CriticalSectionRawMutex, T>,
    button: ButtonEvent,
) {
    let store = ams.store();
    let playing = store.snapshot().is_playing();
    let Some(command) = command_for(button, playing, store.available_commands()) else {
        warn!("No command available for {}", button);
        return;
    };
    match ams.send_command(command).await {
        Ok(()) => info!("Sent {}", command.name()),
        Err(e) => warn!("Command {} failed: {}", command.name(), e),
    }
}
