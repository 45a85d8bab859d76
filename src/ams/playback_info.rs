//! Player/PlaybackInfo value parser.
//!
//! The value is three comma-separated fields:
//! `"<state>,<rate>,<elapsed>"`, e.g. `"1,1.0,42.517"`.
//! Only the first two commas split; the rest belongs to `elapsed`.
//! Each field is read from its leading number, so `"1.0"` as a state
//! reads as 1 and `"2.0,3.0"` as elapsed reads as 2.0.

use core::str::FromStr;

use super::catalog::PlaybackState;

/// Decoded PlaybackInfo value.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlaybackInfo {
    pub state: PlaybackState,
    /// Playback rate. Not bounded by the protocol (negative while
    /// rewinding, above 1 while fast-forwarding).
    pub rate: f32,
    /// Elapsed time in seconds at the moment the phone sent the value.
    pub elapsed: f32,
}

impl PlaybackInfo {
    /// Parse a PlaybackInfo value.
    ///
    /// Returns `None` if either separator is missing or any field does not
    /// start with a number; callers then leave their state untouched. All three
    /// fields are parsed before anything is returned so a bad field never
    /// results in a partial update.
    pub fn parse(value: &str) -> Option<Self> {
        let mut fields = value.splitn(3, ',');
        let state = fields.next()?;
        let rate = fields.next()?;
        let elapsed = fields.next()?;

        let state = leading_number::<i32>(state, false)?;
        let rate = leading_number::<f32>(rate, true).filter(|v| v.is_finite())?;
        let elapsed = leading_number::<f32>(elapsed, true).filter(|v| v.is_finite())?;

        Some(Self {
            state: PlaybackState::from_code(state),
            rate,
            elapsed,
        })
    }
}

/// Number at the start of `field`: optional sign, digits and, when
/// `fractional`, one decimal point. Trailing text is ignored. An empty
/// field reads as zero; a field without leading digits is rejected.
fn leading_number<T: FromStr + Default>(field: &str, fractional: bool) -> Option<T> {
    let field = field.trim();
    if field.is_empty() {
        return Some(T::default());
    }

    let bytes = field.as_bytes();
    let mut end = usize::from(matches!(bytes[0], b'+' | b'-'));
    let mut seen_point = !fractional;
    let mut digits = 0;
    while let Some(&b) = bytes.get(end) {
        match b {
            b'0'..=b'9' => digits += 1,
            b'.' if !seen_point => seen_point = true,
            _ => break,
        }
        end += 1;
    }
    if digits == 0 {
        return None;
    }
    field[..end].parse().ok()
}

/// Parse a numeric attribute string. An empty string is the protocol's
/// "no value" and reads as zero.
pub(crate) fn parse_number<T: FromStr + Default>(s: &str) -> Option<T> {
    let s = s.trim();
    if s.is_empty() {
        return Some(T::default());
    }
    s.parse().ok()
}

/// Like [`parse_number`] but rejects NaN and infinities, which would
/// break epsilon comparisons.
pub(crate) fn parse_float(s: &str) -> Option<f32> {
    parse_number::<f32>(s).filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 0.001;

    fn close(a: f32, b: f32) -> bool {
        let d = a - b;
        d < EPS && d > -EPS
    }

    #[test]
    fn parses_playing() {
        let info = PlaybackInfo::parse("1,1.0,42.517").unwrap();
        assert_eq!(info.state, PlaybackState::Playing);
        assert!(close(info.rate, 1.0));
        assert!(close(info.elapsed, 42.517));
    }

    #[test]
    fn state_rate_elapsed_grid() {
        let rates = [-1.0f32, 0.0, 1.0, 2.5];
        let elapsed = [0.0f32, 12.34];
        let expected = [
            PlaybackState::Paused,
            PlaybackState::Playing,
            PlaybackState::Rewinding,
            PlaybackState::FastForwarding,
        ];
        for state in 0..4 {
            for &rate in &rates {
                for &secs in &elapsed {
                    let text = std::format!("{},{},{}", state, rate, secs);
                    let info = PlaybackInfo::parse(&text).unwrap();
                    assert_eq!(info.state, expected[state], "{}", text);
                    assert!(close(info.rate, rate), "{}", text);
                    assert!(close(info.elapsed, secs), "{}", text);
                }
            }
        }
    }

    #[test]
    fn missing_separators_are_rejected() {
        assert_eq!(PlaybackInfo::parse("1"), None);
        assert_eq!(PlaybackInfo::parse("1,1.0"), None);
        assert_eq!(PlaybackInfo::parse(""), None);
    }

    #[test]
    fn bad_field_rejects_whole_value() {
        assert_eq!(PlaybackInfo::parse("x,1.0,2.0"), None);
        assert_eq!(PlaybackInfo::parse("1,fast,2.0"), None);
        assert_eq!(PlaybackInfo::parse("1,1.0,nan"), None);
        assert_eq!(PlaybackInfo::parse("1,.,2.0"), None);
    }

    #[test]
    fn fields_read_their_leading_number() {
        // Third field keeps everything after the second comma.
        let info = PlaybackInfo::parse("1,1.0,2.0,3.0").unwrap();
        assert_eq!(info.state, PlaybackState::Playing);
        assert!(close(info.elapsed, 2.0));

        let info = PlaybackInfo::parse("1.0,1.0,2.0").unwrap();
        assert_eq!(info.state, PlaybackState::Playing);
        assert!(close(info.rate, 1.0));

        let info = PlaybackInfo::parse("3,-1.5x,7").unwrap();
        assert_eq!(info.state, PlaybackState::FastForwarding);
        assert!(close(info.rate, -1.5));
        assert!(close(info.elapsed, 7.0));
    }

    #[test]
    fn empty_fields_read_as_zero() {
        let info = PlaybackInfo::parse("0,,").unwrap();
        assert_eq!(info.state, PlaybackState::Paused);
        assert_eq!(info.rate, 0.0);
        assert_eq!(info.elapsed, 0.0);
    }

    #[test]
    fn unknown_state_is_paused() {
        let info = PlaybackInfo::parse("9,0.0,1.0").unwrap();
        assert_eq!(info.state, PlaybackState::Paused);
    }

    #[test]
    fn whitespace_is_tolerated() {
        let info = PlaybackInfo::parse(" 2 , -2.0 , 10.5 ").unwrap();
        assert_eq!(info.state, PlaybackState::Rewinding);
        assert!(close(info.rate, -2.0));
        assert!(close(info.elapsed, 10.5));
    }
}
