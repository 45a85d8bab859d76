//! Media snapshot and change detection.

use core::ops::BitOrAssign;

use heapless::String;

use super::catalog::{
    Attribute, PlaybackState, PlayerAttribute, QueueAttribute, RepeatMode, ShuffleMode,
    TrackAttribute,
};
use super::decoder::EntityUpdate;
use super::playback_info::{parse_float, parse_number, PlaybackInfo};

/// Capacity of the player name (bytes).
pub const NAME_CAPACITY: usize = 32;
/// Capacity of artist / album / title (bytes).
pub const TEXT_CAPACITY: usize = 64;

/// Tolerance for float attribute comparisons.
pub const CHANGE_EPSILON: f32 = 0.001;

/// Everything the accessory knows about the phone's media player.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MediaSnapshot {
    pub player_name: String<NAME_CAPACITY>,
    pub playback_state: PlaybackState,
    pub playback_rate: f32,
    pub elapsed_seconds: f32,
    pub duration_seconds: f32,
    pub volume: f32,
    pub shuffle_mode: ShuffleMode,
    pub repeat_mode: RepeatMode,
    pub queue_index: u32,
    pub queue_count: u32,
    pub artist: String<TEXT_CAPACITY>,
    pub album: String<TEXT_CAPACITY>,
    pub title: String<TEXT_CAPACITY>,
}

impl MediaSnapshot {
    pub const fn empty() -> Self {
        Self {
            player_name: String::new(),
            playback_state: PlaybackState::Paused,
            playback_rate: 0.0,
            elapsed_seconds: 0.0,
            duration_seconds: 0.0,
            volume: 0.0,
            shuffle_mode: ShuffleMode::Off,
            repeat_mode: RepeatMode::Off,
            queue_index: 0,
            queue_count: 0,
            artist: String::new(),
            album: String::new(),
            title: String::new(),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playback_state == PlaybackState::Playing
    }

    pub fn is_rewinding(&self) -> bool {
        self.playback_state == PlaybackState::Rewinding
    }

    pub fn is_fast_forwarding(&self) -> bool {
        self.playback_state == PlaybackState::FastForwarding
    }
}

/// Coarse dirty bits computed per entity update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChangeFlags {
    pub playback_changed: bool,
    pub track_changed: bool,
    pub queue_changed: bool,
}

impl ChangeFlags {
    pub const NONE: Self = Self {
        playback_changed: false,
        track_changed: false,
        queue_changed: false,
    };

    pub const ALL: Self = Self {
        playback_changed: true,
        track_changed: true,
        queue_changed: true,
    };

    pub fn any(self) -> bool {
        self.playback_changed || self.track_changed || self.queue_changed
    }
}

impl BitOrAssign for ChangeFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.playback_changed |= rhs.playback_changed;
        self.track_changed |= rhs.track_changed;
        self.queue_changed |= rhs.queue_changed;
    }
}

/// Owns the snapshot for one connection and diffs every update
/// against it.
#[derive(Clone, Debug, Default)]
pub struct MediaState {
    snapshot: MediaSnapshot,
    has_previous: bool,
}

impl MediaState {
    pub const fn new() -> Self {
        Self {
            snapshot: MediaSnapshot::empty(),
            has_previous: false,
        }
    }

    pub fn snapshot(&self) -> &MediaSnapshot {
        &self.snapshot
    }

    /// Back to the freshly-connected state: empty snapshot, and the next
    /// update reports every facet as changed.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Apply one entity update and report which facets changed.
    pub fn apply(&mut self, update: &EntityUpdate<'_>) -> ChangeFlags {
        let mut flags = ChangeFlags::NONE;
        let s = &mut self.snapshot;

        match update.attribute() {
            // Name is tracked but does not raise a flag on its own.
            Some(Attribute::Player(PlayerAttribute::Name)) => {
                set_text(&mut s.player_name, update.value);
            }
            Some(Attribute::Player(PlayerAttribute::PlaybackInfo)) => {
                if let Some(info) = PlaybackInfo::parse(update.value) {
                    flags.playback_changed = info.state != s.playback_state
                        || !approx_eq(info.rate, s.playback_rate)
                        || !approx_eq(info.elapsed, s.elapsed_seconds);
                    s.playback_state = info.state;
                    s.playback_rate = info.rate;
                    s.elapsed_seconds = info.elapsed;
                } else {
                    debug!("Ignoring malformed PlaybackInfo");
                }
            }
            Some(Attribute::Player(PlayerAttribute::Volume)) => {
                flags.playback_changed = update_float(&mut s.volume, update.value);
            }
            Some(Attribute::Queue(attr)) => {
                flags.queue_changed = match attr {
                    QueueAttribute::Index => update_exact(&mut s.queue_index, update.value),
                    QueueAttribute::Count => update_exact(&mut s.queue_count, update.value),
                    QueueAttribute::ShuffleMode => {
                        update_mode(&mut s.shuffle_mode, update.value)
                    }
                    QueueAttribute::RepeatMode => update_mode(&mut s.repeat_mode, update.value),
                };
            }
            Some(Attribute::Track(attr)) => {
                flags.track_changed = match attr {
                    TrackAttribute::Artist => set_text(&mut s.artist, update.value),
                    TrackAttribute::Album => set_text(&mut s.album, update.value),
                    TrackAttribute::Title => set_text(&mut s.title, update.value),
                    TrackAttribute::Duration => {
                        update_float(&mut s.duration_seconds, update.value)
                    }
                };
            }
            None => {
                debug!(
                    "Ignoring unknown attribute {}/{}",
                    update.entity_id,
                    update.attribute_id
                );
            }
        }

        if !self.has_previous {
            self.has_previous = true;
            return ChangeFlags::ALL;
        }
        flags
    }
}

fn approx_eq(a: f32, b: f32) -> bool {
    let d = a - b;
    d <= CHANGE_EPSILON && d >= -CHANGE_EPSILON
}

/// Replace `dst` with `value`, truncated to capacity on a char boundary.
/// Returns whether the stored text changed.
fn set_text<const N: usize>(dst: &mut String<N>, value: &str) -> bool {
    let mut next: String<N> = String::new();
    for c in value.chars() {
        if next.push(c).is_err() {
            break;
        }
    }
    if *dst == next {
        return false;
    }
    *dst = next;
    true
}

fn update_float(dst: &mut f32, value: &str) -> bool {
    let Some(next) = parse_float(value) else {
        debug!("Ignoring non-numeric value");
        return false;
    };
    let changed = !approx_eq(*dst, next);
    *dst = next;
    changed
}

fn update_exact(dst: &mut u32, value: &str) -> bool {
    let Some(next) = parse_number::<u32>(value) else {
        debug!("Ignoring non-numeric value");
        return false;
    };
    let changed = *dst != next;
    *dst = next;
    changed
}

fn update_mode<M: From<u8> + PartialEq>(dst: &mut M, value: &str) -> bool {
    let Some(code) = parse_number::<u8>(value) else {
        debug!("Ignoring non-numeric mode");
        return false;
    };
    let next = M::from(code);
    let changed = *dst != next;
    *dst = next;
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(state: &mut MediaState, frame: &[u8]) -> ChangeFlags {
        let update = EntityUpdate::from_ble_bytes(frame).unwrap();
        state.apply(&update)
    }

    fn frame(entity: u8, attribute: u8, value: &str) -> std::vec::Vec<u8> {
        let mut v = std::vec![entity, attribute, 0];
        v.extend_from_slice(value.as_bytes());
        v
    }

    /// State that has already seen its first update.
    fn primed() -> MediaState {
        let mut state = MediaState::new();
        apply(&mut state, &frame(0, 0, ""));
        state
    }

    #[test]
    fn first_update_forces_all_flags() {
        let mut state = MediaState::new();
        let flags = apply(&mut state, &frame(2, 2, "Song"));
        assert_eq!(flags, ChangeFlags::ALL);
        assert_eq!(state.snapshot().title.as_str(), "Song");
    }

    #[test]
    fn repeated_update_is_quiet() {
        let mut state = MediaState::new();
        apply(&mut state, &frame(2, 2, "Song"));
        assert_eq!(apply(&mut state, &frame(2, 2, "Song")), ChangeFlags::NONE);
    }

    #[test]
    fn reset_restores_first_update_rule() {
        let mut state = primed();
        apply(&mut state, &frame(2, 0, "Artist"));
        state.reset();
        assert_eq!(state.snapshot(), &MediaSnapshot::empty());
        assert_eq!(apply(&mut state, &frame(2, 0, "Artist")), ChangeFlags::ALL);
    }

    #[test]
    fn track_text_sets_track_flag() {
        let mut state = primed();
        for (attr, text) in [(0u8, "Artist"), (1, "Album"), (2, "Title")] {
            let flags = apply(&mut state, &frame(2, attr, text));
            assert!(flags.track_changed);
            assert!(!flags.playback_changed);
            assert!(!flags.queue_changed);
        }
        let s = state.snapshot();
        assert_eq!(s.artist.as_str(), "Artist");
        assert_eq!(s.album.as_str(), "Album");
        assert_eq!(s.title.as_str(), "Title");
    }

    #[test]
    fn player_name_change_raises_no_flag() {
        let mut state = primed();
        let flags = apply(&mut state, &frame(0, 0, "Music"));
        assert_eq!(flags, ChangeFlags::NONE);
        assert_eq!(state.snapshot().player_name.as_str(), "Music");
    }

    #[test]
    fn playback_info_updates_and_flags() {
        let mut state = primed();
        let flags = apply(&mut state, &frame(0, 1, "1,1.0,12.5"));
        assert!(flags.playback_changed);
        let s = state.snapshot();
        assert!(s.is_playing());
        assert!(!s.is_rewinding());
        assert!(!s.is_fast_forwarding());
        assert_eq!(s.playback_rate, 1.0);
        assert_eq!(s.elapsed_seconds, 12.5);

        // Within epsilon: no change.
        let flags = apply(&mut state, &frame(0, 1, "1,1.0,12.5004"));
        assert!(!flags.playback_changed);
    }

    #[test]
    fn malformed_playback_info_keeps_prior_fields() {
        let mut state = primed();
        apply(&mut state, &frame(0, 1, "3,2.0,30.0"));
        let flags = apply(&mut state, &frame(0, 1, "1"));
        assert_eq!(flags, ChangeFlags::NONE);
        let s = state.snapshot();
        assert!(s.is_fast_forwarding());
        assert_eq!(s.playback_rate, 2.0);
        assert_eq!(s.elapsed_seconds, 30.0);
    }

    #[test]
    fn volume_raises_playback_flag() {
        let mut state = primed();
        assert!(apply(&mut state, &frame(0, 2, "0.5")).playback_changed);
        assert!(!apply(&mut state, &frame(0, 2, "0.5")).playback_changed);
        assert_eq!(state.snapshot().volume, 0.5);
    }

    #[test]
    fn non_numeric_volume_is_ignored() {
        let mut state = primed();
        apply(&mut state, &frame(0, 2, "0.75"));
        assert_eq!(apply(&mut state, &frame(0, 2, "loud")), ChangeFlags::NONE);
        assert_eq!(state.snapshot().volume, 0.75);
    }

    #[test]
    fn duration_raises_track_flag() {
        let mut state = primed();
        assert!(apply(&mut state, &frame(2, 3, "215.3")).track_changed);
        assert!(!apply(&mut state, &frame(2, 3, "215.3")).track_changed);
        assert_eq!(state.snapshot().duration_seconds, 215.3);
    }

    #[test]
    fn queue_fields_raise_queue_flag() {
        let mut state = primed();
        assert!(apply(&mut state, &frame(1, 0, "4")).queue_changed);
        assert!(apply(&mut state, &frame(1, 1, "300")).queue_changed);
        assert!(apply(&mut state, &frame(1, 2, "2")).queue_changed);
        assert!(apply(&mut state, &frame(1, 3, "1")).queue_changed);
        assert!(!apply(&mut state, &frame(1, 3, "1")).queue_changed);

        let s = state.snapshot();
        assert_eq!(s.queue_index, 4);
        assert_eq!(s.queue_count, 300);
        assert_eq!(s.shuffle_mode, ShuffleMode::All);
        assert_eq!(s.repeat_mode, RepeatMode::One);
    }

    #[test]
    fn empty_value_clears_attribute() {
        let mut state = primed();
        apply(&mut state, &frame(2, 2, "Song"));
        assert!(apply(&mut state, &frame(2, 2, "")).track_changed);
        assert!(state.snapshot().title.is_empty());
    }

    #[test]
    fn unknown_attribute_leaves_snapshot_alone() {
        let mut state = primed();
        let before = state.snapshot().clone();
        assert_eq!(apply(&mut state, &frame(2, 9, "x")), ChangeFlags::NONE);
        assert_eq!(apply(&mut state, &frame(5, 0, "x")), ChangeFlags::NONE);
        assert_eq!(state.snapshot(), &before);
    }

    #[test]
    fn long_text_is_truncated_to_capacity() {
        let mut state = primed();
        let long = "é".repeat(TEXT_CAPACITY);
        apply(&mut state, &frame(2, 2, &long));
        let title = &state.snapshot().title;
        assert_eq!(title.len(), TEXT_CAPACITY);
        assert!(title.chars().all(|c| c == 'é'));
    }

    #[test]
    fn change_flags_merge() {
        let mut acc = ChangeFlags::NONE;
        acc |= ChangeFlags {
            track_changed: true,
            ..ChangeFlags::NONE
        };
        acc |= ChangeFlags {
            queue_changed: true,
            ..ChangeFlags::NONE
        };
        assert!(acc.any());
        assert!(!acc.playback_changed);
        assert!(acc.track_changed && acc.queue_changed);
    }
}
