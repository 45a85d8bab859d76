//! Outbound remote commands, gated by the phone's availability mask.
//!
//! The mask reflects the last Remote Command notification only. A
//! command the gate lets through may still be ignored by the phone if its
//! capabilities changed in the meantime.

use super::catalog::RemoteCommandId;
use super::decoder::CommandMask;
use super::error::CommandError;
use super::transport::{AmsCharacteristic, AmsTransport};

/// Check whether `command` may be written right now.
pub fn check<T: AmsTransport>(
    transport: &T,
    mask: CommandMask,
    command: RemoteCommandId,
) -> Result<(), CommandError> {
    if !transport.has_characteristic(AmsCharacteristic::RemoteCommand) {
        return Err(CommandError::NotBound);
    }
    if !mask.contains(command) {
        return Err(CommandError::Unavailable(command));
    }
    Ok(())
}

/// Gate and send a single-byte remote command (write with response).
pub async fn send<T: AmsTransport>(
    transport: &T,
    mask: CommandMask,
    command: RemoteCommandId,
) -> Result<(), CommandError> {
    check(transport, mask, command)?;
    transport
        .write(AmsCharacteristic::RemoteCommand, &[command as u8])
        .await?;
    debug!("Sent remote command {}", command.name());
    Ok(())
}
