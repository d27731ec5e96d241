use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

/// Console clock packet (type 0x60).
///
/// The console keeps local time with minute resolution and a two-digit year.
#[derive(Debug, Clone, PartialEq)]
pub struct Clock {
    pub date_time: NaiveDateTime,
}

impl Clock {
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 9 {
            return None;
        }
        let date_time = NaiveDate::from_ymd_opt(2000 + data[8] as i32, data[7] as u32, data[6] as u32)?
            .and_hms_opt(data[5] as u32, data[4] as u32, 0)?;
        Some(Self { date_time })
    }
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Console clock: {}", self.date_time.format("%Y-%m-%d %H:%M"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_from_bytes() {
        // 2013-01-12 06:07
        let data = [0x00, 0x60, 0x00, 0x00, 0x07, 0x06, 0x0C, 0x01, 0x0D, 0x01, 0x7A, 0x00];
        let clock = Clock::from_bytes(&data).unwrap();
        let expected = NaiveDate::from_ymd_opt(2013, 1, 12)
            .unwrap()
            .and_hms_opt(6, 7, 0)
            .unwrap();
        assert_eq!(clock.date_time, expected);
        assert_eq!(clock.to_string(), "Console clock: 2013-01-12 06:07");
    }

    #[test]
    fn test_clock_invalid_date() {
        // month 13
        let data = [0x00, 0x60, 0x00, 0x00, 0x07, 0x06, 0x0C, 0x0D, 0x0D];
        assert!(Clock::from_bytes(&data).is_none());
    }

    #[test]
    fn test_clock_insufficient_data() {
        assert!(Clock::from_bytes(&[0x00, 0x60, 0x00, 0x00, 0x07, 0x06]).is_none());
    }
}
