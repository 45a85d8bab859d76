//! One AMS session on one connection.
//!
//! An [`AmsClient`] is created by a successful [`AmsClient::start`] and
//! lives until the link drops. It borrows the shared [`MediaStore`] and owns
//! the transport, so several clients on several connections can coexist
//! with separate stores.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::RawMutex;

use super::catalog::{Attribute, RemoteCommandId, TrackAttribute};
use super::decoder::{self, utf8_prefix, AmsEvent, EntityUpdate, EntityUpdateFlags};
use super::error::{CommandError, GattError, SetupError};
use super::gate;
use super::state::{ChangeFlags, MediaSnapshot, TEXT_CAPACITY};
use super::store::{MediaStore, MediaUpdate};
use super::subscription;
use super::transport::{AmsCharacteristic, AmsTransport};

/// Receiver of aggregated media changes. Called outside the store lock,
/// and only when at least one flag is set.
pub trait MediaSink {
    fn on_media_changed(&mut self, snapshot: &MediaSnapshot, flags: ChangeFlags);
}

impl<F> MediaSink for F
where
    F: FnMut(&MediaSnapshot, ChangeFlags),
{
    fn on_media_changed(&mut self, snapshot: &MediaSnapshot, flags: ChangeFlags) {
        self(snapshot, flags)
    }
}

/// Sink for callers that only poll [`MediaStore::take_update`].
pub struct NoSink;

impl MediaSink for NoSink {
    fn on_media_changed(&mut self, _snapshot: &MediaSnapshot, _flags: ChangeFlags) {}
}

/// Track text attributes waiting for a full-value fetch, one bit per
/// attribute id.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct RefetchSet(u8);

impl RefetchSet {
    fn insert(&mut self, attribute: TrackAttribute) {
        self.0 |= 1 << attribute as u8;
    }

    fn remove(&mut self, attribute: TrackAttribute) {
        self.0 &= !(1 << attribute as u8);
    }

    /// Lowest pending id, removed from the set.
    fn pop(&mut self) -> Option<TrackAttribute> {
        if self.0 == 0 {
            return None;
        }
        let id = self.0.trailing_zeros() as u8;
        self.0 &= !(1 << id);
        TrackAttribute::from_u8(id)
    }
}

pub struct AmsClient<'s, M: RawMutex, T: AmsTransport> {
    store: &'s MediaStore<M>,
    transport: T,
    refetch: Cell<RefetchSet>,
}

impl<'s, M: RawMutex, T: AmsTransport> AmsClient<'s, M, T> {
    /// Run subscription setup and, on success, return an Active client.
    ///
    /// On failure the store is left Unsubscribed and nothing is retried.
    pub async fn start(store: &'s MediaStore<M>, transport: T) -> Result<Self, SetupError> {
        if !store.begin_subscribe() {
            return Err(SetupError::NotIdle);
        }

        if let Err(e) = subscription::subscribe(&transport).await {
            warn!("AMS setup failed: {}", e);
            store.reset();
            return Err(e);
        }

        store.activate();
        info!("AMS subscriptions active");
        Ok(Self {
            store,
            transport,
            refetch: Cell::new(RefetchSet::default()),
        })
    }

    pub fn store(&self) -> &'s MediaStore<M> {
        self.store
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Feed a raw notification from `source`. Malformed frames are
    /// absorbed and logged.
    pub fn on_notification(
        &self,
        source: AmsCharacteristic,
        data: &[u8],
        sink: &mut impl MediaSink,
    ) -> Option<MediaUpdate> {
        let event = match decoder::decode(source, data)? {
            Ok(event) => event,
            Err(e) => {
                debug!("Dropping {} notification: {}", source.uuid(), e);
                return None;
            }
        };

        if let AmsEvent::EntityUpdate(update) = &event {
            self.track_truncation(update);
        }

        let update = self.store.apply_event(event)?;
        sink.on_media_changed(&update.snapshot, update.flags);
        Some(update)
    }

    /// Queue a truncated artist, album or title for a full fetch. A later
    /// complete value cancels the fetch.
    fn track_truncation(&self, update: &EntityUpdate<'_>) {
        let Some(Attribute::Track(
            attribute @ (TrackAttribute::Artist | TrackAttribute::Album | TrackAttribute::Title),
        )) = update.attribute()
        else {
            return;
        };

        let mut pending = self.refetch.get();
        // Text already at capacity would not change on a full fetch.
        if update.flags.is_truncated() && update.value.len() < TEXT_CAPACITY {
            pending.insert(attribute);
        } else {
            pending.remove(attribute);
        }
        self.refetch.set(pending);
    }

    pub fn has_pending_refetch(&self) -> bool {
        self.refetch.get() != RefetchSet::default()
    }

    /// Next attribute whose last update arrived truncated, removed from
    /// the queue. Pass it to [`refresh_attribute`](Self::refresh_attribute).
    pub fn next_refetch(&self) -> Option<Attribute> {
        let mut pending = self.refetch.get();
        let next = pending.pop();
        self.refetch.set(pending);
        next.map(Attribute::Track)
    }

    pub fn on_entity_update(&self, data: &[u8], sink: &mut impl MediaSink) -> Option<MediaUpdate> {
        self.on_notification(AmsCharacteristic::EntityUpdate, data, sink)
    }

    pub fn on_command_availability(&self, data: &[u8]) {
        self.on_notification(AmsCharacteristic::RemoteCommand, data, &mut NoSink);
    }

    pub fn can_send(&self, command: RemoteCommandId) -> bool {
        self.store.can_send(command)
    }

    /// Gate against the current mask, then write the command byte. The
    /// store lock is released before the write starts.
    pub async fn send_command(&self, command: RemoteCommandId) -> Result<(), CommandError> {
        let mask = self.store.available_commands();
        gate::send(&self.transport, mask, command)
            .await
            .inspect_err(|e| debug!("Command {} not sent: {}", command.name(), e))
    }

    /// Fetch the full value of an attribute through Entity Attribute.
    ///
    /// Used for values whose update carried the Truncated flag. The result
    /// is cut to the longest valid UTF-8 prefix that fits `buf`.
    pub async fn fetch_attribute<'b>(
        &self,
        attribute: Attribute,
        buf: &'b mut [u8],
    ) -> Result<&'b str, GattError> {
        let request = [attribute.entity() as u8, attribute.id()];
        self.transport
            .write(AmsCharacteristic::EntityAttribute, &request)
            .await?;
        let len = self
            .transport
            .read(AmsCharacteristic::EntityAttribute, buf)
            .await?;
        Ok(utf8_prefix(&buf[..len.min(buf.len())]))
    }

    /// Fetch the full value of `attribute` and apply it as if it had
    /// arrived in an untruncated notification.
    pub async fn refresh_attribute(
        &self,
        attribute: Attribute,
        sink: &mut impl MediaSink,
    ) -> Result<Option<MediaUpdate>, GattError> {
        let mut buf = [0u8; TEXT_CAPACITY];
        let value = self.fetch_attribute(attribute, &mut buf).await?;
        let update = EntityUpdate {
            entity_id: attribute.entity() as u8,
            attribute_id: attribute.id(),
            flags: EntityUpdateFlags::default(),
            value,
        };
        let applied = self.store.apply_event(AmsEvent::EntityUpdate(update));
        if let Some(applied) = &applied {
            sink.on_media_changed(&applied.snapshot, applied.flags);
        }
        Ok(applied)
    }

    /// End the session. The store returns to Unsubscribed with an empty
    /// snapshot and mask.
    pub fn disconnect(self) {}
}

impl<M: RawMutex, T: AmsTransport> Drop for AmsClient<'_, M, T> {
    fn drop(&mut self) {
        self.store.reset();
        debug!("AMS session closed");
    }
}
