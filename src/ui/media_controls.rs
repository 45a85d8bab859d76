//! Button → remote command mapping.
//!
//! Each button has an ordered list of acceptable commands; the first one
//! the phone currently advertises wins.

use crate::ams::{CommandMask, RemoteCommandId};
use crate::ui::ButtonEvent;

/// Pick the remote command a button press should send, given what the
/// phone currently accepts. `None` when nothing suitable is available.
pub fn command_for(
    button: ButtonEvent,
    playing: bool,
    mask: CommandMask,
) -> Option<RemoteCommandId> {
    let candidates: &[RemoteCommandId] = match button {
        ButtonEvent::PlayPause if playing => {
            &[RemoteCommandId::TogglePlayPause, RemoteCommandId::Pause]
        }
        ButtonEvent::PlayPause => &[RemoteCommandId::TogglePlayPause, RemoteCommandId::Play],
        ButtonEvent::Next => &[RemoteCommandId::NextTrack, RemoteCommandId::SkipForward],
        ButtonEvent::Previous => &[RemoteCommandId::PreviousTrack, RemoteCommandId::SkipBackward],
        ButtonEvent::VolumeUp => &[RemoteCommandId::VolumeUp],
        ButtonEvent::VolumeDown => &[RemoteCommandId::VolumeDown],
    };

    candidates.iter().copied().find(|cmd| mask.contains(*cmd))
}
