//! Boundary between the AMS client and the BLE stack.
//!
//! The client never touches GATT handles directly. The firmware wraps its
//! discovered characteristics in an [`AmsTransport`] implementation; host
//! tests use an in-memory fake.

use super::error::GattError;

/// The three characteristics of the AMS service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AmsCharacteristic {
    /// Write + notify. Outbound commands, inbound availability lists.
    RemoteCommand,
    /// Write with response + notify. Subscriptions out, updates in.
    EntityUpdate,
    /// Read + write. Full values of truncated attributes.
    EntityAttribute,
}

impl AmsCharacteristic {
    pub const ALL: [AmsCharacteristic; 3] = [
        AmsCharacteristic::RemoteCommand,
        AmsCharacteristic::EntityUpdate,
        AmsCharacteristic::EntityAttribute,
    ];

    /// Canonical UUID string.
    pub const fn uuid(self) -> &'static str {
        match self {
            AmsCharacteristic::RemoteCommand => super::REMOTE_COMMAND_UUID,
            AmsCharacteristic::EntityUpdate => super::ENTITY_UPDATE_UUID,
            AmsCharacteristic::EntityAttribute => super::ENTITY_ATTRIBUTE_UUID,
        }
    }
}

/// GATT operations the AMS client needs from the BLE stack.
///
/// All writes are "write request" (with response) so that AMS error
/// codes come back as [`GattError::Att`].
#[allow(async_fn_in_trait)]
pub trait AmsTransport {
    /// Whether discovery resolved this characteristic.
    fn has_characteristic(&self, characteristic: AmsCharacteristic) -> bool;

    /// Write the CCCD of `characteristic`.
    async fn set_notifications(
        &self,
        characteristic: AmsCharacteristic,
        enabled: bool,
    ) -> Result<(), GattError>;

    /// Write request with response.
    async fn write(&self, characteristic: AmsCharacteristic, data: &[u8]) -> Result<(), GattError>;

    /// Read the characteristic value into `buf`, returning the length.
    async fn read(&self, characteristic: AmsCharacteristic, buf: &mut [u8])
        -> Result<usize, GattError>;
}
