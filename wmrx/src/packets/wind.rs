use std::fmt;

/// Raw wind values are in 0.1 m/s; records carry km/h.
fn to_kph(raw: u32) -> f64 {
    raw as f64 * 3.6 / 10.0
}

/// Anemometer packet (type 0x48). Speeds are in km/h, direction in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct Wind {
    pub battery_status: u8,
    pub direction: f64,
    pub speed: f64,
    pub gust: f64,
}

impl Wind {
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 7 {
            return None;
        }
        let speed = to_kph(((data[6] as u32) << 4) + (data[5] >> 4) as u32);
        let gust = to_kph(u16::from_le_bytes([data[4], data[5] & 0x0F]) as u32);
        Some(Self {
            battery_status: data[0] >> 4,
            // 16 compass sectors
            direction: (data[2] & 0x0F) as f64 * 360.0 / 16.0,
            speed,
            gust,
        })
    }

    /// The station occasionally reports a gust below the average speed;
    /// such gusts are not real data.
    pub fn valid_gust(&self) -> Option<f64> {
        (self.gust >= self.speed).then_some(self.gust)
    }
}

impl fmt::Display for Wind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Wind: {:.1} km/h from {:.1}° | Gust: {:.1} km/h (Battery: {})",
            self.speed, self.direction, self.gust, self.battery_status
        )
    }
}
