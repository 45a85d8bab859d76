//! Shared media state.
//!
//! The BLE notification context writes and the render loop reads. Both
//! go through one blocking mutex; every critical section is a handful of
//! field updates plus at most one snapshot copy, and no I/O ever happens
//! while it is held. Readers only ever get copies.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use super::catalog::RemoteCommandId;
use super::decoder::{AmsEvent, CommandMask, EntityUpdate};
use super::error::FrameError;
use super::state::{ChangeFlags, MediaSnapshot, MediaState};

/// Client lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    #[default]
    Unsubscribed,
    Subscribing,
    Active,
}

/// A snapshot copy together with the facets that changed.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MediaUpdate {
    pub snapshot: MediaSnapshot,
    pub flags: ChangeFlags,
}

struct Session {
    link: LinkState,
    media: MediaState,
    commands: CommandMask,
    /// Flags accumulated since the last [`MediaStore::take_update`].
    pending: ChangeFlags,
}

impl Session {
    const fn new() -> Self {
        Self {
            link: LinkState::Unsubscribed,
            media: MediaState::new(),
            commands: CommandMask::EMPTY,
            pending: ChangeFlags::NONE,
        }
    }
}

/// Lock-protected home of the snapshot, the command mask and the
/// "state changed" flag for one connection.
pub struct MediaStore<M: RawMutex> {
    inner: Mutex<M, RefCell<Session>>,
}

impl<M: RawMutex> MediaStore<M> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Session::new())),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    pub fn link_state(&self) -> LinkState {
        self.with(|s| s.link)
    }

    /// Full copy of the current snapshot.
    pub fn snapshot(&self) -> MediaSnapshot {
        self.with(|s| s.media.snapshot().clone())
    }

    pub fn available_commands(&self) -> CommandMask {
        self.with(|s| s.commands)
    }

    pub fn can_send(&self, command: RemoteCommandId) -> bool {
        self.available_commands().contains(command)
    }

    /// Take the accumulated change flags and a snapshot copy, if anything
    /// changed since the last call.
    pub fn take_update(&self) -> Option<MediaUpdate> {
        self.with(|s| {
            if !s.pending.any() {
                return None;
            }
            let flags = core::mem::take(&mut s.pending);
            Some(MediaUpdate {
                snapshot: s.media.snapshot().clone(),
                flags,
            })
        })
    }

    /// Unsubscribed → Subscribing. Fails if a session is already running.
    ///
    /// An Unsubscribed session is already empty; an unpolled update from
    /// the last [`reset`](Self::reset) stays pending.
    pub(crate) fn begin_subscribe(&self) -> bool {
        self.with(|s| {
            if s.link != LinkState::Unsubscribed {
                return false;
            }
            s.link = LinkState::Subscribing;
            true
        })
    }

    /// Subscribing → Active.
    pub(crate) fn activate(&self) {
        self.with(|s| {
            if s.link == LinkState::Subscribing {
                s.link = LinkState::Active;
            }
        })
    }

    /// Drop everything and return to Unsubscribed. Used on disconnect and
    /// on setup failure.
    ///
    /// Pollers see the cleared snapshot as one last update with every flag
    /// set, so nothing from the old session stays on screen.
    pub fn reset(&self) {
        self.with(|s| {
            *s = Session::new();
            s.pending = ChangeFlags::ALL;
        });
    }

    /// Apply a decoded notification.
    ///
    /// Returns the snapshot copy and flags when an entity update set at
    /// least one flag. Events arriving outside Active change nothing.
    pub fn apply_event(&self, event: AmsEvent<'_>) -> Option<MediaUpdate> {
        if let AmsEvent::EntityUpdate(update) = &event {
            if update.flags.is_truncated() {
                trace!(
                    "Attribute {}/{} truncated",
                    update.entity_id,
                    update.attribute_id
                );
            }
        }

        self.with(|s| {
            if s.link != LinkState::Active {
                return None;
            }
            match event {
                AmsEvent::CommandAvailability(mask) => {
                    s.commands = mask;
                    None
                }
                AmsEvent::EntityUpdate(update) => {
                    let flags = s.media.apply(&update);
                    if !flags.any() {
                        return None;
                    }
                    s.pending |= flags;
                    Some(MediaUpdate {
                        snapshot: s.media.snapshot().clone(),
                        flags,
                    })
                }
            }
        })
    }

    /// Decode and apply an Entity Update notification. Short frames
    /// change nothing.
    pub fn apply_entity_update(&self, data: &[u8]) -> Option<MediaUpdate> {
        match EntityUpdate::from_ble_bytes(data) {
            Ok(update) => self.apply_event(AmsEvent::EntityUpdate(update)),
            Err(e) => {
                debug!("Dropping entity update: {}", e);
                None
            }
        }
    }

    /// Decode a Remote Command notification and replace the mask.
    ///
    /// Returns whether the mask was stored: `Ok(false)` outside Active.
    /// An invalid frame leaves the previous mask in place.
    pub fn apply_command_availability(&self, data: &[u8]) -> Result<bool, FrameError> {
        let mask = CommandMask::from_ble_bytes(data).inspect_err(|e| {
            warn!("Rejecting command list: {}", e);
        })?;
        Ok(self.with(|s| {
            if s.link != LinkState::Active {
                return false;
            }
            s.commands = mask;
            true
        }))
    }
}

impl<M: RawMutex> Default for MediaStore<M> {
    fn default() -> Self {
        Self::new()
    }
}
