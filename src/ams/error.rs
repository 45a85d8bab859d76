//! Error types for the AMS client.
//!
//! All variants carry only fixed-size data so the client stays usable
//! without `alloc`.

use core::fmt;

use super::catalog::{AmsErrorCode, EntityId, RemoteCommandId};
use super::transport::AmsCharacteristic;

/// An inbound notification that could not be decoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Entity update shorter than the 3-byte header.
    TooShort { len: usize },
    /// Command id that does not fit the 32-bit availability mask.
    InvalidCommandId(u8),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::TooShort { len } => write!(f, "frame too short ({} bytes)", len),
            FrameError::InvalidCommandId(id) => write!(f, "command id {} out of range", id),
        }
    }
}

/// Failure reported by the GATT transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GattError {
    /// The peer answered with an ATT error code.
    Att(u8),
    /// The link dropped before the operation completed.
    Disconnected,
    /// The local stack refused the operation.
    Rejected,
}

impl GattError {
    /// AMS-specific meaning of the ATT code, if any.
    pub fn ams_error(&self) -> Option<AmsErrorCode> {
        match self {
            GattError::Att(code) => AmsErrorCode::from_att(*code),
            _ => None,
        }
    }
}

impl fmt::Display for GattError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GattError::Att(code) => match AmsErrorCode::from_att(*code) {
                Some(ams) => write!(f, "ATT error 0x{:02X} ({:?})", code, ams),
                None => write!(f, "ATT error 0x{:02X}", code),
            },
            GattError::Disconnected => f.write_str("disconnected"),
            GattError::Rejected => f.write_str("rejected by local stack"),
        }
    }
}

/// Why subscription setup failed. The client is back in Unsubscribed
/// whenever one of these is returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SetupError {
    /// Setup was requested while a session is already subscribing or active.
    NotIdle,
    /// A required AMS characteristic was not discovered.
    MissingCharacteristic(AmsCharacteristic),
    /// Enabling notifications on a characteristic failed.
    Notifications(AmsCharacteristic, GattError),
    /// The phone rejected an entity subscription write.
    Subscribe(EntityId, GattError),
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::NotIdle => f.write_str("client is not idle"),
            SetupError::MissingCharacteristic(c) => write!(f, "missing characteristic {:?}", c),
            SetupError::Notifications(c, e) => {
                write!(f, "enabling notifications on {:?} failed: {}", c, e)
            }
            SetupError::Subscribe(entity, e) => write!(f, "subscribing to {:?} failed: {}", entity, e),
        }
    }
}

/// Why an outbound remote command was not sent (or failed).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// No Remote Command characteristic is bound to the session.
    NotBound,
    /// The last availability mask does not include the command.
    Unavailable(RemoteCommandId),
    /// The write itself failed.
    Write(GattError),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::NotBound => f.write_str("remote command characteristic not bound"),
            CommandError::Unavailable(cmd) => write!(f, "{} is not currently available", cmd.name()),
            CommandError::Write(e) => write!(f, "command write failed: {}", e),
        }
    }
}

impl From<GattError> for CommandError {
    fn from(e: GattError) -> Self {
        CommandError::Write(e)
    }
}
