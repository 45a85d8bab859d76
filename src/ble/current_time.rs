//! Current Time Service (0x1805) decoding.
//!
//! Current Time characteristic (0x2A2B) layout, little-endian:
//! ```text
//! Byte 0-1: Year
//! Byte 2:   Month (1-12, 0 = unknown)
//! Byte 3:   Day (1-31, 0 = unknown)
//! Byte 4:   Hours
//! Byte 5:   Minutes
//! Byte 6:   Seconds
//! Byte 7:   Day of week (1 = Monday .. 7 = Sunday, 0 = unknown)
//! Byte 8:   Fractions256
//! Byte 9:   Adjust reason
//! ```

use core::fmt::Write;

use heapless::String;

/// Current Time characteristic size.
pub const CURRENT_TIME_LEN: usize = 10;

pub const SECONDS_PER_DAY: u32 = 86_400;

/// Why the phone last adjusted its clock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdjustReason(pub u8);

impl AdjustReason {
    pub const MANUAL: u8 = 0x01;
    pub const EXTERNAL_REFERENCE: u8 = 0x02;
    pub const TIME_ZONE: u8 = 0x04;
    pub const DAYLIGHT_SAVING: u8 = 0x08;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CurrentTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub day_of_week: u8,
    pub fractions256: u8,
    pub adjust_reason: AdjustReason,
}

impl CurrentTime {
    /// Parse from a raw characteristic read.
    ///
    /// Short reads and out-of-range fields return `None`. Trailing bytes
    /// beyond the 10-byte layout are ignored.
    pub fn from_ble_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < CURRENT_TIME_LEN {
            return None;
        }
        let time = Self {
            year: u16::from_le_bytes([data[0], data[1]]),
            month: data[2],
            day: data[3],
            hours: data[4],
            minutes: data[5],
            seconds: data[6],
            day_of_week: data[7],
            fractions256: data[8],
            adjust_reason: AdjustReason(data[9]),
        };
        time.is_valid().then_some(time)
    }

    fn is_valid(&self) -> bool {
        self.month <= 12
            && self.day <= 31
            && self.hours < 24
            && self.minutes < 60
            && self.seconds < 60
            && self.day_of_week <= 7
    }

    pub fn seconds_of_day(&self) -> u32 {
        self.hours as u32 * 3600 + self.minutes as u32 * 60 + self.seconds as u32
    }

    /// Three-letter weekday, or an empty string when unknown.
    pub fn weekday_name(&self) -> &'static str {
        match self.day_of_week {
            1 => "Mon",
            2 => "Tue",
            3 => "Wed",
            4 => "Thu",
            5 => "Fri",
            6 => "Sat",
            7 => "Sun",
            _ => "",
        }
    }
}

/// `HH:MM` for a second-of-day count. Wraps past midnight.
pub fn format_clock(seconds_of_day: u32) -> String<5> {
    let secs = seconds_of_day % SECONDS_PER_DAY;
    let mut s = String::new();
    let _ = write!(&mut s, "{:02}:{:02}", secs / 3600, (secs / 60) % 60);
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: [u8; 10] = [0xE8, 0x07, 3, 14, 15, 9, 26, 4, 128, 0x02];

    #[test]
    fn decodes_current_time() {
        let t = CurrentTime::from_ble_bytes(&SAMPLE).unwrap();
        assert_eq!(t.year, 2024);
        assert_eq!((t.month, t.day), (3, 14));
        assert_eq!((t.hours, t.minutes, t.seconds), (15, 9, 26));
        assert_eq!(t.weekday_name(), "Thu");
        assert_eq!(t.fractions256, 128);
        assert_eq!(t.adjust_reason, AdjustReason(AdjustReason::EXTERNAL_REFERENCE));
        assert_eq!(t.seconds_of_day(), 15 * 3600 + 9 * 60 + 26);
    }

    #[test]
    fn short_read_rejected() {
        assert_eq!(CurrentTime::from_ble_bytes(&SAMPLE[..9]), None);
        assert_eq!(CurrentTime::from_ble_bytes(&[]), None);
    }

    #[test]
    fn trailing_bytes_ignored() {
        let mut long = [0u8; 12];
        long[..10].copy_from_slice(&SAMPLE);
        long[10] = 0xFF;
        assert_eq!(
            CurrentTime::from_ble_bytes(&long),
            CurrentTime::from_ble_bytes(&SAMPLE)
        );
    }

    #[test]
    fn out_of_range_fields_rejected() {
        let mut bad = SAMPLE;
        bad[4] = 24;
        assert_eq!(CurrentTime::from_ble_bytes(&bad), None);

        let mut bad = SAMPLE;
        bad[2] = 13;
        assert_eq!(CurrentTime::from_ble_bytes(&bad), None);
    }

    #[test]
    fn unknown_date_fields_allowed() {
        let t = CurrentTime::from_ble_bytes(&[0, 0, 0, 0, 7, 30, 0, 0, 0, 0]).unwrap();
        assert_eq!(t.weekday_name(), "");
        assert_eq!(format_clock(t.seconds_of_day()).as_str(), "07:30");
    }

    #[test]
    fn clock_wraps_at_midnight() {
        assert_eq!(format_clock(0).as_str(), "00:00");
        assert_eq!(format_clock(SECONDS_PER_DAY - 1).as_str(), "23:59");
        assert_eq!(format_clock(SECONDS_PER_DAY + 61).as_str(), "00:01");
    }
}
