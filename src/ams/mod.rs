//! Apple Media Service client.
//!
//! Protocol core of the accessory: subscription setup, notification
//! decoding, media state aggregation with change detection, and gated
//! remote commands. Nothing in here touches the BLE stack directly; the
//! firmware plugs its GATT client in through [`AmsTransport`].
//!
//! ```text
//!   notification ──► decoder ──► MediaStore (lock) ──► MediaSink / take_update
//!                                     │
//!   button ──► gate (mask) ──► Remote Command write
//! ```

pub mod catalog;
pub mod client;
pub mod decoder;
pub mod error;
pub mod gate;
pub mod playback_info;
pub mod state;
pub mod store;
pub mod subscription;
pub mod transport;

pub use catalog::{
    AmsErrorCode, Attribute, EntityId, PlaybackState, PlayerAttribute, QueueAttribute,
    RemoteCommandId, RepeatMode, ShuffleMode, TrackAttribute,
};
pub use client::{AmsClient, MediaSink, NoSink};
pub use decoder::{AmsEvent, CommandMask, EntityUpdate, EntityUpdateFlags};
pub use error::{CommandError, FrameError, GattError, SetupError};
pub use playback_info::PlaybackInfo;
pub use state::{ChangeFlags, MediaSnapshot, MediaState};
pub use store::{LinkState, MediaStore, MediaUpdate};
pub use transport::{AmsCharacteristic, AmsTransport};

/// AMS primary service.
pub const SERVICE_UUID: &str = "89D3502B-0F36-433A-8EF4-C502AD55F8DC";
/// Remote Command characteristic (write, notify).
pub const REMOTE_COMMAND_UUID: &str = "9B3C81D8-57B1-4A8A-B8DF-0E56F7CA51C2";
/// Entity Update characteristic (write with response, notify).
pub const ENTITY_UPDATE_UUID: &str = "2F7CABCE-808D-411F-9A0C-BB92BA96C102";
/// Entity Attribute characteristic (read, write).
pub const ENTITY_ATTRIBUTE_UUID: &str = "C6B2F38C-23AB-46D8-A6AB-A3A870BBD5D7";

/// Service UUID in big-endian byte order, as written in the UUID string.
/// Reverse it for little-endian BLE wire order.
pub const SERVICE_UUID_BYTES: [u8; 16] = [
    0x89, 0xD3, 0x50, 0x2B, 0x0F, 0x36, 0x43, 0x3A, 0x8E, 0xF4, 0xC5, 0x02, 0xAD, 0x55, 0xF8, 0xDC,
];
