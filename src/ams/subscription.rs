//! Entity Update subscriptions.
//!
//! Each subscription is a single write of `[EntityID, AttributeID...]`
//! to the Entity Update characteristic. The phone then notifies every
//! change of the listed attributes.

use heapless::Vec;

use super::catalog::{EntityId, PlayerAttribute, QueueAttribute, TrackAttribute};
use super::error::SetupError;
use super::transport::{AmsCharacteristic, AmsTransport};

/// Largest subscription frame: entity id plus four attributes.
pub const MAX_SUBSCRIPTION_FRAME: usize = 5;

/// One entity and the attributes we want notified for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntitySubscription {
    pub entity: EntityId,
    pub attributes: &'static [u8],
}

impl EntitySubscription {
    /// Wire frame for this subscription.
    pub fn frame(&self) -> Vec<u8, MAX_SUBSCRIPTION_FRAME> {
        let mut frame = Vec::new();
        let _ = frame.push(self.entity as u8);
        for &attr in self.attributes {
            if frame.push(attr).is_err() {
                break;
            }
        }
        frame
    }
}

/// Everything the accessory subscribes to, in write order.
pub const SUBSCRIPTIONS: [EntitySubscription; 3] = [
    EntitySubscription {
        entity: EntityId::Player,
        attributes: &[
            PlayerAttribute::Name as u8,
            PlayerAttribute::PlaybackInfo as u8,
            PlayerAttribute::Volume as u8,
        ],
    },
    EntitySubscription {
        entity: EntityId::Queue,
        attributes: &[
            QueueAttribute::Index as u8,
            QueueAttribute::Count as u8,
            QueueAttribute::ShuffleMode as u8,
            QueueAttribute::RepeatMode as u8,
        ],
    },
    EntitySubscription {
        entity: EntityId::Track,
        attributes: &[
            TrackAttribute::Artist as u8,
            TrackAttribute::Album as u8,
            TrackAttribute::Title as u8,
            TrackAttribute::Duration as u8,
        ],
    },
];

/// Characteristics that deliver notifications to the client.
const NOTIFY_SOURCES: [AmsCharacteristic; 2] = [
    AmsCharacteristic::EntityUpdate,
    AmsCharacteristic::RemoteCommand,
];

/// Verify discovery, enable notifications and write every subscription.
///
/// Nothing is written unless all three characteristics are present. If a
/// later step fails, notifications enabled so far are switched off again
/// before the error is returned.
pub async fn subscribe<T: AmsTransport>(transport: &T) -> Result<(), SetupError> {
    for characteristic in AmsCharacteristic::ALL {
        if !transport.has_characteristic(characteristic) {
            warn!("AMS characteristic {} not found", characteristic.uuid());
            return Err(SetupError::MissingCharacteristic(characteristic));
        }
    }

    let mut enabled = 0;
    let result = enable_and_write(transport, &mut enabled).await;
    if result.is_err() {
        for &characteristic in NOTIFY_SOURCES[..enabled].iter().rev() {
            if transport.set_notifications(characteristic, false).await.is_err() {
                debug!("Could not disable notifications during rollback");
            }
        }
    }
    result
}

async fn enable_and_write<T: AmsTransport>(
    transport: &T,
    enabled: &mut usize,
) -> Result<(), SetupError> {
    // Entity Update notifications must be on before subscribing, or the
    // phone answers with Invalid State.
    for characteristic in NOTIFY_SOURCES {
        transport
            .set_notifications(characteristic, true)
            .await
            .map_err(|e| SetupError::Notifications(characteristic, e))?;
        *enabled += 1;
    }

    for subscription in &SUBSCRIPTIONS {
        let frame = subscription.frame();
        transport
            .write(AmsCharacteristic::EntityUpdate, &frame)
            .await
            .map_err(|e| SetupError::Subscribe(subscription.entity, e))?;
        debug!("Subscribed to entity {}", subscription.entity);
    }

    Ok(())
}
