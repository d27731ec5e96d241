use std::fmt;

/// Barometer packet (type 0x46). Pressures are in mbar; only the low 12 bits
/// of each value are significant.
#[derive(Debug, Clone, PartialEq)]
pub struct Barometer {
    pub station_pressure: f64,
    pub sea_level_pressure: f64,
}

impl Barometer {
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 6 {
            return None;
        }
        Some(Self {
            station_pressure: u16::from_le_bytes([data[2], data[3] & 0x0F]) as f64,
            sea_level_pressure: u16::from_le_bytes([data[4], data[5] & 0x0F]) as f64,
        })
    }
}

impl fmt::Display for Barometer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Barometer: station {:.0} mbar | sea level {:.0} mbar",
            self.station_pressure, self.sea_level_pressure
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_barometer_from_bytes() {
        // 1013 mbar station, 1017 mbar sea level, forecast bits in the high nibbles
        let data = [0x00, 0x46, 0xF5, 0x33, 0xF9, 0x03];
        let baro = Barometer::from_bytes(&data).unwrap();
        assert_abs_diff_eq!(baro.station_pressure, 1013.0);
        assert_abs_diff_eq!(baro.sea_level_pressure, 1017.0);
    }

    #[test]
    fn test_barometer_insufficient_data() {
        assert!(Barometer::from_bytes(&[0x00, 0x46, 0xF5]).is_none());
    }
}
