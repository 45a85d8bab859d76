//! Host-testable library interface for ams2oled.
//!
//! Holds the Apple Media Service client and every piece of pure logic the
//! firmware uses (advertising payload, Current Time decoding, button
//! mapping, now-playing text). Nothing here needs hardware.
//!
//! Usage: `cargo test --lib` or `cargo test`
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main]
//! and links this library for its protocol logic.

#![cfg_attr(not(test), no_std)]

// Must come first so the logging macros are visible to every module.
mod fmt;

pub mod ams;

// Internal module paths for the actual implementations
#[path = "ble/adv_payload.rs"]
mod ble_adv_payload_impl;
#[path = "ble/current_time.rs"]
mod ble_current_time_impl;

#[path = "ui/media_controls.rs"]
mod ui_media_controls_impl;
#[path = "ui/now_playing.rs"]
mod ui_now_playing_impl;

pub mod ble {
    pub mod adv_payload {
        pub use crate::ble_adv_payload_impl::*;
    }
    pub mod current_time {
        pub use crate::ble_current_time_impl::*;
    }
}

pub mod ui {
    /// Physical button events (after debouncing).
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub enum ButtonEvent {
        PlayPause,
        Next,
        Previous,
        VolumeUp,
        VolumeDown,
    }

    pub mod media_controls {
        pub use crate::ui_media_controls_impl::command_for;
    }

    pub mod now_playing {
        pub use crate::ui_now_playing_impl::*;
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use crate::ams::*;
    use crate::ble::adv_payload::*;
    use crate::ui::media_controls::command_for;
    use crate::ui::now_playing::*;
    use crate::ui::ButtonEvent;

    fn mask(ids: &[u8]) -> CommandMask {
        CommandMask::from_ble_bytes(ids).unwrap()
    }

    // ════════════════════════════════════════════════════════════════════════
    // Advertising Payload Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn adv_payload_layout() {
        let adv = build_advertisement(&SERVICE_UUID_BYTES, "AMS");
        assert_eq!(&adv[..3], &[2, AD_TYPE_FLAGS, FLAGS_GENERAL_DISCOVERABLE]);
        assert_eq!(&adv[3..5], &[17, AD_TYPE_SOLICITED_UUID128]);
        // Little-endian on the wire.
        assert_eq!(adv[5], 0xDC);
        assert_eq!(adv[20], 0x89);
        assert_eq!(&adv[21..], &[4, AD_TYPE_COMPLETE_NAME, b'A', b'M', b'S']);
    }

    #[test]
    fn adv_payload_round_trips_through_parser() {
        let adv = build_advertisement(&SERVICE_UUID_BYTES, "Remote");
        assert!(solicits_service(&adv, &SERVICE_UUID_BYTES));
        assert_eq!(local_name(&adv).unwrap().as_str(), "Remote");
    }

    #[test]
    fn adv_payload_shortens_long_name() {
        let adv = build_advertisement(&SERVICE_UUID_BYTES, "AMS Remote Control");
        assert!(adv.len() <= MAX_ADV_LEN);
        assert_eq!(find_ad_field(&adv, AD_TYPE_COMPLETE_NAME), None);
        assert_eq!(
            find_ad_field(&adv, AD_TYPE_SHORTENED_NAME),
            Some(&b"AMS Remo"[..])
        );
    }

    #[test]
    fn adv_payload_shortens_on_char_boundary() {
        // 7 ASCII chars then a two-byte char straddling the 8-byte limit.
        let adv = build_advertisement(&SERVICE_UUID_BYTES, "Lautspré");
        assert_eq!(adv.len(), MAX_ADV_LEN - 1);
        assert_eq!(local_name(&adv).unwrap().as_str(), "Lautspr");
    }

    #[test]
    fn adv_payload_without_name() {
        let adv = build_advertisement(&SERVICE_UUID_BYTES, "");
        assert_eq!(adv.len(), 21);
        assert_eq!(local_name(&adv), None);
    }

    #[test]
    fn adv_payload_name_keeps_valid_utf8_prefix() {
        // "Ok" followed by a lone continuation byte.
        let adv = [4, AD_TYPE_COMPLETE_NAME, b'O', b'k', 0x80];
        assert_eq!(local_name(&adv).unwrap().as_str(), "Ok");
    }

    #[test]
    fn adv_payload_rejects_other_service() {
        let mut other = SERVICE_UUID_BYTES;
        other[0] ^= 0xFF;
        let adv = build_advertisement(&other, "x");
        assert!(!solicits_service(&adv, &SERVICE_UUID_BYTES));
    }

    #[test]
    fn adv_payload_handles_malformed_lengths() {
        assert_eq!(find_ad_field(&[0x00], AD_TYPE_FLAGS), None);
        assert_eq!(find_ad_field(&[0x05, 0x01, 0x06], AD_TYPE_FLAGS), None);
        assert!(!solicits_service(&[0x11, 0x15, 0x00], &SERVICE_UUID_BYTES));
    }

    // ════════════════════════════════════════════════════════════════════════
    // Button Mapping Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn play_pause_prefers_toggle() {
        let m = mask(&[0, 1, 2]);
        assert_eq!(
            command_for(ButtonEvent::PlayPause, true, m),
            Some(RemoteCommandId::TogglePlayPause)
        );
        assert_eq!(
            command_for(ButtonEvent::PlayPause, false, m),
            Some(RemoteCommandId::TogglePlayPause)
        );
    }

    #[test]
    fn play_pause_falls_back_on_state() {
        let m = mask(&[0, 1]);
        assert_eq!(
            command_for(ButtonEvent::PlayPause, true, m),
            Some(RemoteCommandId::Pause)
        );
        assert_eq!(
            command_for(ButtonEvent::PlayPause, false, m),
            Some(RemoteCommandId::Play)
        );
        assert_eq!(command_for(ButtonEvent::PlayPause, true, mask(&[0])), None);
    }

    #[test]
    fn track_buttons_fall_back_to_skip() {
        assert_eq!(
            command_for(ButtonEvent::Next, false, mask(&[3, 9])),
            Some(RemoteCommandId::NextTrack)
        );
        assert_eq!(
            command_for(ButtonEvent::Next, false, mask(&[9])),
            Some(RemoteCommandId::SkipForward)
        );
        assert_eq!(
            command_for(ButtonEvent::Previous, false, mask(&[10])),
            Some(RemoteCommandId::SkipBackward)
        );
        assert_eq!(command_for(ButtonEvent::Previous, false, mask(&[3])), None);
    }

    #[test]
    fn volume_buttons_need_exact_command() {
        assert_eq!(
            command_for(ButtonEvent::VolumeUp, true, mask(&[5, 6])),
            Some(RemoteCommandId::VolumeUp)
        );
        assert_eq!(
            command_for(ButtonEvent::VolumeDown, true, mask(&[5])),
            None
        );
    }

    #[test]
    fn empty_mask_maps_nothing() {
        for button in [
            ButtonEvent::PlayPause,
            ButtonEvent::Next,
            ButtonEvent::Previous,
            ButtonEvent::VolumeUp,
            ButtonEvent::VolumeDown,
        ] {
            assert_eq!(command_for(button, false, CommandMask::EMPTY), None);
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Now-Playing Text Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(0.0).as_str(), "0:00");
        assert_eq!(format_duration(59.9).as_str(), "0:59");
        assert_eq!(format_duration(61.0).as_str(), "1:01");
        assert_eq!(format_duration(3599.0).as_str(), "59:59");
        assert_eq!(format_duration(3723.0).as_str(), "1:02:03");
        assert_eq!(format_duration(-5.0).as_str(), "0:00");
        assert_eq!(format_duration(f32::NAN).as_str(), "0:00");
    }

    fn playing(elapsed: f32, rate: f32, duration: f32) -> MediaSnapshot {
        let mut s = MediaSnapshot::empty();
        s.playback_state = PlaybackState::Playing;
        s.playback_rate = rate;
        s.elapsed_seconds = elapsed;
        s.duration_seconds = duration;
        s
    }

    #[test]
    fn elapsed_advances_by_rate() {
        assert_eq!(extrapolate_elapsed(&playing(10.0, 1.0, 200.0), 5.0), 15.0);
        assert_eq!(extrapolate_elapsed(&playing(10.0, 2.0, 200.0), 5.0), 20.0);
        assert_eq!(extrapolate_elapsed(&playing(10.0, -1.0, 200.0), 20.0), 0.0);
    }

    #[test]
    fn elapsed_clamped_to_duration() {
        assert_eq!(extrapolate_elapsed(&playing(190.0, 1.0, 200.0), 30.0), 200.0);
        // Unknown duration: no upper clamp.
        assert_eq!(extrapolate_elapsed(&playing(190.0, 1.0, 0.0), 30.0), 220.0);
    }

    #[test]
    fn elapsed_frozen_when_paused() {
        let mut s = playing(42.0, 1.0, 200.0);
        s.playback_state = PlaybackState::Paused;
        assert_eq!(extrapolate_elapsed(&s, 100.0), 42.0);
    }

    #[test]
    fn progress_percentages() {
        assert_eq!(progress_percent(50.0, 200.0), 25);
        assert_eq!(progress_percent(250.0, 200.0), 100);
        assert_eq!(progress_percent(10.0, 0.0), 0);
        assert_eq!(progress_percent(-1.0, 100.0), 0);
        assert_eq!(progress_percent(f32::NAN, 100.0), 0);
    }

    #[test]
    fn glyphs_and_queue_position() {
        assert_eq!(state_glyph(PlaybackState::Playing), ">");
        assert_eq!(state_glyph(PlaybackState::Paused), "||");
        assert_eq!(queue_position(2, 12).as_str(), "3/12");
        assert_eq!(queue_position(0, 0).as_str(), "");
        assert_eq!(queue_position(u32::MAX, 5).as_str(), "5/5");
    }

    #[test]
    fn mode_badges() {
        assert_eq!(mode_badge(ShuffleMode::Off, RepeatMode::Off).as_str(), "");
        assert_eq!(mode_badge(ShuffleMode::All, RepeatMode::One).as_str(), "S R1");
        assert_eq!(mode_badge(ShuffleMode::Off, RepeatMode::All).as_str(), "R");
        assert_eq!(
            mode_badge(ShuffleMode::Unknown(9), RepeatMode::Unknown(9)).as_str(),
            ""
        );
    }

    #[test]
    fn scroll_window_sweeps_and_pauses() {
        assert_eq!(scroll_window("short", 10, 7), "short");
        let text = "abcdefgh";
        assert_eq!(scroll_window(text, 4, 0), "abcd");
        assert_eq!(scroll_window(text, 4, 2), "abcd");
        assert_eq!(scroll_window(text, 4, 3), "bcde");
        assert_eq!(scroll_window(text, 4, 6), "efgh");
        assert_eq!(scroll_window(text, 4, 8), "efgh");
        assert_eq!(scroll_window(text, 4, 9), "abcd");
    }

    #[test]
    fn scroll_window_respects_multibyte_chars() {
        assert_eq!(scroll_window("ééééé", 2, 2), "éé");
        assert_eq!(scroll_window("aébéc", 3, 2), "ébé");
    }
}
