//! Inbound AMS notification decoding.
//!
//! Entity Update notification layout:
//! ```text
//! Byte 0:    EntityID
//! Byte 1:    AttributeID
//! Byte 2:    EntityUpdateFlags (bit 0 = Truncated)
//! Byte 3..:  UTF-8 value, possibly empty
//! ```
//!
//! Remote Command notifications are a bare list of command id bytes.

use super::catalog::{Attribute, RemoteCommandId};
use super::error::FrameError;
use super::transport::AmsCharacteristic;

/// Entity update header size.
pub const ENTITY_UPDATE_HEADER_SIZE: usize = 3;

/// Flags byte of an entity update. Kept verbatim so bits added by later
/// protocol revisions survive decoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EntityUpdateFlags(pub u8);

impl EntityUpdateFlags {
    pub const TRUNCATED: u8 = 0x01;

    /// The value was cut to fit the notification; the full value can be
    /// fetched through the Entity Attribute characteristic.
    pub fn is_truncated(self) -> bool {
        self.0 & Self::TRUNCATED != 0
    }

    pub fn bits(self) -> u8 {
        self.0
    }
}

/// A decoded Entity Update notification borrowing its value from the
/// notification buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntityUpdate<'a> {
    pub entity_id: u8,
    pub attribute_id: u8,
    pub flags: EntityUpdateFlags,
    pub value: &'a str,
}

impl<'a> EntityUpdate<'a> {
    /// Parse from raw notification bytes.
    pub fn from_ble_bytes(data: &'a [u8]) -> Result<Self, FrameError> {
        if data.len() < ENTITY_UPDATE_HEADER_SIZE {
            return Err(FrameError::TooShort { len: data.len() });
        }
        Ok(Self {
            entity_id: data[0],
            attribute_id: data[1],
            flags: EntityUpdateFlags(data[2]),
            value: utf8_prefix(&data[ENTITY_UPDATE_HEADER_SIZE..]),
        })
    }

    /// The typed address, or `None` for pairs this revision does not know.
    pub fn attribute(&self) -> Option<Attribute> {
        Attribute::from_ids(self.entity_id, self.attribute_id)
    }
}

/// Longest valid UTF-8 prefix. Truncated values may end mid-character.
pub(crate) fn utf8_prefix(bytes: &[u8]) -> &str {
    match core::str::from_utf8(bytes) {
        Ok(s) => s,
        // `valid_up_to` always lands on a char boundary.
        Err(e) => core::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or_default(),
    }
}

/// Set of remote commands the phone currently accepts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandMask(u32);

impl CommandMask {
    pub const EMPTY: Self = Self(0);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Fold a Remote Command notification into a mask. Any id >= 32
    /// rejects the whole frame.
    pub fn from_ble_bytes(data: &[u8]) -> Result<Self, FrameError> {
        let mut bits = 0u32;
        for &id in data {
            if id >= 32 {
                return Err(FrameError::InvalidCommandId(id));
            }
            bits |= 1 << id;
        }
        Ok(Self(bits))
    }

    pub const fn contains(self, command: RemoteCommandId) -> bool {
        (self.0 >> command as u8) & 1 == 1
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// A decoded AMS notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AmsEvent<'a> {
    EntityUpdate(EntityUpdate<'a>),
    CommandAvailability(CommandMask),
}

/// Decode a notification according to the characteristic it came from.
///
/// Entity Attribute never notifies; anything arriving on it is `None`.
pub fn decode(
    source: AmsCharacteristic,
    data: &[u8],
) -> Option<Result<AmsEvent<'_>, FrameError>> {
    match source {
        AmsCharacteristic::EntityUpdate => {
            Some(EntityUpdate::from_ble_bytes(data).map(AmsEvent::EntityUpdate))
        }
        AmsCharacteristic::RemoteCommand => {
            Some(CommandMask::from_ble_bytes(data).map(AmsEvent::CommandAvailability))
        }
        AmsCharacteristic::EntityAttribute => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ams::catalog::TrackAttribute;

    #[test]
    fn entity_update_header_and_value() {
        let data = [2, 2, 0, b'S', b'o', b'n', b'g'];
        let update = EntityUpdate::from_ble_bytes(&data).unwrap();
        assert_eq!(update.entity_id, 2);
        assert_eq!(update.attribute_id, 2);
        assert_eq!(update.flags, EntityUpdateFlags(0));
        assert_eq!(update.value, "Song");
        assert_eq!(
            update.attribute(),
            Some(Attribute::Track(TrackAttribute::Title))
        );
    }

    #[test]
    fn entity_update_empty_value() {
        let update = EntityUpdate::from_ble_bytes(&[0, 0, 0]).unwrap();
        assert_eq!(update.value, "");
    }

    #[test]
    fn entity_update_short_frames_rejected() {
        assert_eq!(
            EntityUpdate::from_ble_bytes(&[]),
            Err(FrameError::TooShort { len: 0 })
        );
        assert_eq!(
            EntityUpdate::from_ble_bytes(&[2, 2]),
            Err(FrameError::TooShort { len: 2 })
        );
    }

    #[test]
    fn entity_update_flags_pass_through() {
        let update = EntityUpdate::from_ble_bytes(&[2, 0, 0x81, b'A']).unwrap();
        assert!(update.flags.is_truncated());
        assert_eq!(update.flags.bits(), 0x81);
    }

    #[test]
    fn entity_update_unknown_pair_keeps_raw_ids() {
        let update = EntityUpdate::from_ble_bytes(&[7, 9, 0, b'x']).unwrap();
        assert_eq!(update.attribute(), None);
        assert_eq!((update.entity_id, update.attribute_id), (7, 9));
    }

    #[test]
    fn entity_update_cut_multibyte_char() {
        // "Café" with the final two-byte 'é' cut in half.
        let data = [2, 1, 1, b'C', b'a', b'f', 0xC3];
        let update = EntityUpdate::from_ble_bytes(&data).unwrap();
        assert_eq!(update.value, "Caf");
    }

    #[test]
    fn command_mask_from_list() {
        let mask = CommandMask::from_ble_bytes(&[0, 3]).unwrap();
        assert_eq!(mask.bits(), 0b1001);
        assert!(mask.contains(RemoteCommandId::Play));
        assert!(mask.contains(RemoteCommandId::NextTrack));
        assert!(!mask.contains(RemoteCommandId::Pause));
    }

    #[test]
    fn command_mask_is_order_and_duplicate_independent() {
        let a = CommandMask::from_ble_bytes(&[5, 1, 13, 1, 5]).unwrap();
        let b = CommandMask::from_ble_bytes(&[13, 5, 1]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.bits(), (1 << 1) | (1 << 5) | (1 << 13));
    }

    #[test]
    fn command_mask_accepts_unassigned_ids_below_32() {
        let mask = CommandMask::from_ble_bytes(&[31, 20]).unwrap();
        assert_eq!(mask.bits(), (1 << 31) | (1 << 20));
        assert!(RemoteCommandId::ALL.iter().all(|cmd| !mask.contains(*cmd)));
    }

    #[test]
    fn command_mask_rejects_out_of_range_id() {
        assert_eq!(
            CommandMask::from_ble_bytes(&[0, 32]),
            Err(FrameError::InvalidCommandId(32))
        );
        assert_eq!(
            CommandMask::from_ble_bytes(&[255]),
            Err(FrameError::InvalidCommandId(255))
        );
    }

    #[test]
    fn command_mask_empty_frame() {
        let mask = CommandMask::from_ble_bytes(&[]).unwrap();
        assert!(mask.is_empty());
    }

    #[test]
    fn decode_dispatches_on_source() {
        assert_eq!(
            decode(AmsCharacteristic::RemoteCommand, &[1]),
            Some(Ok(AmsEvent::CommandAvailability(CommandMask::from_bits(0b10))))
        );
        assert!(matches!(
            decode(AmsCharacteristic::EntityUpdate, &[0, 0, 0, b'M']),
            Some(Ok(AmsEvent::EntityUpdate(u))) if u.value == "M"
        ));
        assert_eq!(
            decode(AmsCharacteristic::EntityUpdate, &[0]),
            Some(Err(FrameError::TooShort { len: 1 }))
        );
        assert_eq!(decode(AmsCharacteristic::EntityAttribute, &[0, 0, 0]), None);
    }
}
