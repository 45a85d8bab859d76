//! AMS entity / attribute / command vocabulary.
//!
//! Attribute ids are only meaningful together with the entity that
//! defines them, so they are modelled as one enum per entity and joined
//! in [`Attribute`].

/// Addressable AMS entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum EntityId {
    Player = 0,
    Queue = 1,
    Track = 2,
}

impl EntityId {
    pub const fn from_u8(id: u8) -> Option<Self> {
        match id {
            0 => Some(EntityId::Player),
            1 => Some(EntityId::Queue),
            2 => Some(EntityId::Track),
            _ => None,
        }
    }
}

/// Attributes of the Player entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PlayerAttribute {
    /// Localized name of the now-playing app.
    Name = 0,
    /// `"<state>,<rate>,<elapsed>"`.
    PlaybackInfo = 1,
    /// Float string, 0 (silent) to 1 (full volume).
    Volume = 2,
}

impl PlayerAttribute {
    pub const fn from_u8(id: u8) -> Option<Self> {
        match id {
            0 => Some(PlayerAttribute::Name),
            1 => Some(PlayerAttribute::PlaybackInfo),
            2 => Some(PlayerAttribute::Volume),
            _ => None,
        }
    }
}

/// Attributes of the Queue entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum QueueAttribute {
    Index = 0,
    Count = 1,
    ShuffleMode = 2,
    RepeatMode = 3,
}

impl QueueAttribute {
    pub const fn from_u8(id: u8) -> Option<Self> {
        match id {
            0 => Some(QueueAttribute::Index),
            1 => Some(QueueAttribute::Count),
            2 => Some(QueueAttribute::ShuffleMode),
            3 => Some(QueueAttribute::RepeatMode),
            _ => None,
        }
    }
}

/// Attributes of the Track entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TrackAttribute {
    Artist = 0,
    Album = 1,
    Title = 2,
    /// Float string, total track duration in seconds.
    Duration = 3,
}

impl TrackAttribute {
    pub const fn from_u8(id: u8) -> Option<Self> {
        match id {
            0 => Some(TrackAttribute::Artist),
            1 => Some(TrackAttribute::Album),
            2 => Some(TrackAttribute::Title),
            3 => Some(TrackAttribute::Duration),
            _ => None,
        }
    }
}

/// A fully-qualified (entity, attribute) address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Attribute {
    Player(PlayerAttribute),
    Queue(QueueAttribute),
    Track(TrackAttribute),
}

impl Attribute {
    /// Resolve a raw `(entity, attribute)` pair. Unknown entities or
    /// attributes not defined by that entity yield `None`.
    pub const fn from_ids(entity: u8, attribute: u8) -> Option<Self> {
        match EntityId::from_u8(entity) {
            Some(EntityId::Player) => match PlayerAttribute::from_u8(attribute) {
                Some(a) => Some(Attribute::Player(a)),
                None => None,
            },
            Some(EntityId::Queue) => match QueueAttribute::from_u8(attribute) {
                Some(a) => Some(Attribute::Queue(a)),
                None => None,
            },
            Some(EntityId::Track) => match TrackAttribute::from_u8(attribute) {
                Some(a) => Some(Attribute::Track(a)),
                None => None,
            },
            None => None,
        }
    }

    pub const fn entity(self) -> EntityId {
        match self {
            Attribute::Player(_) => EntityId::Player,
            Attribute::Queue(_) => EntityId::Queue,
            Attribute::Track(_) => EntityId::Track,
        }
    }

    /// Attribute id within its entity.
    pub const fn id(self) -> u8 {
        match self {
            Attribute::Player(a) => a as u8,
            Attribute::Queue(a) => a as u8,
            Attribute::Track(a) => a as u8,
        }
    }
}

/// Remote commands an accessory may send to the media player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum RemoteCommandId {
    Play = 0,
    Pause = 1,
    TogglePlayPause = 2,
    NextTrack = 3,
    PreviousTrack = 4,
    VolumeUp = 5,
    VolumeDown = 6,
    AdvanceRepeatMode = 7,
    AdvanceShuffleMode = 8,
    SkipForward = 9,
    SkipBackward = 10,
    LikeTrack = 11,
    DislikeTrack = 12,
    BookmarkTrack = 13,
}

impl RemoteCommandId {
    pub const ALL: [RemoteCommandId; 14] = [
        RemoteCommandId::Play,
        RemoteCommandId::Pause,
        RemoteCommandId::TogglePlayPause,
        RemoteCommandId::NextTrack,
        RemoteCommandId::PreviousTrack,
        RemoteCommandId::VolumeUp,
        RemoteCommandId::VolumeDown,
        RemoteCommandId::AdvanceRepeatMode,
        RemoteCommandId::AdvanceShuffleMode,
        RemoteCommandId::SkipForward,
        RemoteCommandId::SkipBackward,
        RemoteCommandId::LikeTrack,
        RemoteCommandId::DislikeTrack,
        RemoteCommandId::BookmarkTrack,
    ];

    pub const fn from_u8(id: u8) -> Option<Self> {
        if (id as usize) < Self::ALL.len() {
            Some(Self::ALL[id as usize])
        } else {
            None
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            RemoteCommandId::Play => "Play",
            RemoteCommandId::Pause => "Pause",
            RemoteCommandId::TogglePlayPause => "TogglePlayPause",
            RemoteCommandId::NextTrack => "NextTrack",
            RemoteCommandId::PreviousTrack => "PreviousTrack",
            RemoteCommandId::VolumeUp => "VolumeUp",
            RemoteCommandId::VolumeDown => "VolumeDown",
            RemoteCommandId::AdvanceRepeatMode => "AdvanceRepeatMode",
            RemoteCommandId::AdvanceShuffleMode => "AdvanceShuffleMode",
            RemoteCommandId::SkipForward => "SkipForward",
            RemoteCommandId::SkipBackward => "SkipBackward",
            RemoteCommandId::LikeTrack => "LikeTrack",
            RemoteCommandId::DislikeTrack => "DislikeTrack",
            RemoteCommandId::BookmarkTrack => "BookmarkTrack",
        }
    }
}

/// Playback state carried in the first PlaybackInfo field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlaybackState {
    #[default]
    Paused,
    Playing,
    Rewinding,
    FastForwarding,
}

impl PlaybackState {
    /// 1/2/3 map to a moving state; everything else is Paused.
    pub const fn from_code(code: i32) -> Self {
        match code {
            1 => PlaybackState::Playing,
            2 => PlaybackState::Rewinding,
            3 => PlaybackState::FastForwarding,
            _ => PlaybackState::Paused,
        }
    }
}

/// Queue shuffle mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShuffleMode {
    #[default]
    Off,
    One,
    All,
    /// Value not defined by the current protocol revision.
    Unknown(u8),
}

impl From<u8> for ShuffleMode {
    fn from(code: u8) -> Self {
        match code {
            0 => ShuffleMode::Off,
            1 => ShuffleMode::One,
            2 => ShuffleMode::All,
            other => ShuffleMode::Unknown(other),
        }
    }
}

/// Queue repeat mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RepeatMode {
    #[default]
    Off,
    One,
    All,
    /// Value not defined by the current protocol revision.
    Unknown(u8),
}

impl From<u8> for RepeatMode {
    fn from(code: u8) -> Self {
        match code {
            0 => RepeatMode::Off,
            1 => RepeatMode::One,
            2 => RepeatMode::All,
            other => RepeatMode::Unknown(other),
        }
    }
}

/// ATT error codes defined by AMS, returned on Entity Update /
/// Entity Attribute writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AmsErrorCode {
    /// Notifications on Entity Update were not enabled before writing.
    InvalidState = 0xA0,
    /// The command was improperly formatted.
    InvalidCommand = 0xA1,
    /// The requested attribute is empty.
    AbsentAttribute = 0xA2,
}

impl AmsErrorCode {
    pub const fn from_att(code: u8) -> Option<Self> {
        match code {
            0xA0 => Some(AmsErrorCode::InvalidState),
            0xA1 => Some(AmsErrorCode::InvalidCommand),
            0xA2 => Some(AmsErrorCode::AbsentAttribute),
            _ => None,
        }
    }
}
