//! Text helpers for the now-playing screen. Pure functions, no drawing.

use core::fmt::Write;

use heapless::String;

use crate::ams::{MediaSnapshot, PlaybackState, RepeatMode, ShuffleMode};

/// `m:ss` below an hour, `h:mm:ss` above. Negative and NaN read as zero.
pub fn format_duration(seconds: f32) -> String<10> {
    // Float-to-int casts saturate, and NaN becomes 0.
    let total = seconds as u32;
    let (h, m, s) = (total / 3600, (total / 60) % 60, total % 60);
    let mut out = String::new();
    if h > 0 {
        let _ = write!(&mut out, "{}:{:02}:{:02}", h, m, s);
    } else {
        let _ = write!(&mut out, "{}:{:02}", m, s);
    }
    out
}

/// Elapsed time `since_update` seconds after the snapshot was taken.
///
/// The phone only reports elapsed time on state changes, so the display
/// advances it locally by the playback rate. Clamped to the duration when
/// one is known.
pub fn extrapolate_elapsed(snapshot: &MediaSnapshot, since_update: f32) -> f32 {
    let mut elapsed = snapshot.elapsed_seconds;
    if snapshot.playback_state != PlaybackState::Paused {
        elapsed += snapshot.playback_rate * since_update;
    }
    if elapsed < 0.0 {
        elapsed = 0.0;
    }
    if snapshot.duration_seconds > 0.0 && elapsed > snapshot.duration_seconds {
        elapsed = snapshot.duration_seconds;
    }
    elapsed
}

/// Whole-percent progress, 0 when the duration is unknown.
pub fn progress_percent(elapsed: f32, duration: f32) -> u8 {
    if duration.is_nan() || elapsed.is_nan() || duration <= 0.0 || elapsed <= 0.0 {
        return 0;
    }
    let pct = (elapsed / duration * 100.0) as u32;
    pct.min(100) as u8
}

pub fn state_glyph(state: PlaybackState) -> &'static str {
    match state {
        PlaybackState::Playing => ">",
        PlaybackState::Paused => "||",
        PlaybackState::Rewinding => "<<",
        PlaybackState::FastForwarding => ">>",
    }
}

/// `3/12` with a one-based index, empty when the queue is unknown.
pub fn queue_position(index: u32, count: u32) -> String<24> {
    let mut out = String::new();
    if count > 0 {
        let _ = write!(&mut out, "{}/{}", index.saturating_add(1).min(count), count);
    }
    out
}

/// Short shuffle/repeat badge, e.g. `S R1`. Empty when both are off.
pub fn mode_badge(shuffle: ShuffleMode, repeat: RepeatMode) -> String<8> {
    let mut out = String::new();
    match shuffle {
        ShuffleMode::One => {
            let _ = out.push_str("S1");
        }
        ShuffleMode::All => {
            let _ = out.push_str("S");
        }
        ShuffleMode::Off | ShuffleMode::Unknown(_) => {}
    }
    let repeat_tag = match repeat {
        RepeatMode::One => "R1",
        RepeatMode::All => "R",
        RepeatMode::Off | RepeatMode::Unknown(_) => "",
    };
    if !repeat_tag.is_empty() {
        if !out.is_empty() {
            let _ = out.push(' ');
        }
        let _ = out.push_str(repeat_tag);
    }
    out
}

/// A `width`-char window into `text` for marquee scrolling.
///
/// Text that fits is returned whole. Longer text scrolls one char per
/// tick and pauses for `width / 2` ticks at each end of the sweep.
pub fn scroll_window(text: &str, width: usize, tick: usize) -> &str {
    let len = text.chars().count();
    if len <= width || width == 0 {
        return text;
    }
    let travel = len - width;
    let pause = width / 2;
    let period = travel + 2 * pause + 1;
    let offset = (tick % period).saturating_sub(pause).min(travel);

    let mut indices = text.char_indices().map(|(i, _)| i).chain(core::iter::once(text.len()));
    let start = indices.nth(offset).unwrap_or(text.len());
    let end = indices.nth(width - 1).unwrap_or(text.len());
    &text[start..end]
}
