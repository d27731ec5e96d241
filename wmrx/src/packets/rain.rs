use std::fmt;

/// Rain gauge packet (type 0x41).
///
/// The gauge registers in increments of 0.04 in, which only comes out right
/// when the raw counts are divided by 100. Values are in inches (per hour for
/// the rate).
#[derive(Debug, Clone, PartialEq)]
pub struct Rain {
    pub battery_status: u8,
    pub rate: f64,
    pub hour: f64,
    pub day: f64,
    pub total: f64,
}

impl Rain {
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 10 {
            return None;
        }
        let hundredths = |lo: usize| u16::from_le_bytes([data[lo], data[lo + 1]]) as f64 / 100.0;
        Some(Self {
            battery_status: data[0] >> 4,
            rate: hundredths(2),
            hour: hundredths(4),
            day: hundredths(6),
            total: hundredths(8),
        })
    }
}

impl fmt::Display for Rain {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Rain: rate {:.2} in/h | hour {:.2} in | day {:.2} in | total {:.2} in | battery {}",
            self.rate, self.hour, self.day, self.total, self.battery_status
        )
    }
}
