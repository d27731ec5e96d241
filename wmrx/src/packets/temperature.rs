use std::fmt;

/// Temperature/humidity packet (type 0x42).
///
/// Channel 0 is the console (indoor) sensor, channel 1 the outdoor sensor,
/// and channels 2 and up are extra sensors.
#[derive(Debug, Clone, PartialEq)]
pub struct Temperature {
    pub battery_status: u8,
    pub channel: u8,
    pub temperature: f64, // Celsius
    pub humidity: f64,    // Percent
}

impl Temperature {
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 6 {
            return None;
        }
        let magnitude = u16::from_le_bytes([data[3], data[4] & 0x7F]) as f64 / 10.0;
        let temperature = if data[4] & 0x80 != 0 { -magnitude } else { magnitude };
        Some(Self {
            battery_status: (data[0] & 0x40) >> 6,
            channel: data[2] & 0x0F,
            temperature,
            humidity: data[5] as f64,
        })
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Temperature: {:.1}°C | Humidity: {:.0}% (Channel: {}, Battery: {})",
            self.temperature, self.humidity, self.channel, self.battery_status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_temperature_from_bytes() {
        // 21.5°C, 45%, outdoor, low battery
        let data = [0x40, 0x42, 0x01, 0xD7, 0x00, 0x2D, 0x00];
        let temp = Temperature::from_bytes(&data).unwrap();
        assert_eq!(temp.channel, 1);
        assert_eq!(temp.battery_status, 1);
        assert_abs_diff_eq!(temp.temperature, 21.5);
        assert_abs_diff_eq!(temp.humidity, 45.0);
    }

    #[test]
    fn test_temperature_negative() {
        // -12.3°C on channel 0
        let data = [0x00, 0x42, 0x00, 0x7B, 0x80, 0x50];
        let temp = Temperature::from_bytes(&data).unwrap();
        assert_eq!(temp.channel, 0);
        assert_eq!(temp.battery_status, 0);
        assert_abs_diff_eq!(temp.temperature, -12.3);
    }

    #[test]
    fn test_temperature_channel_ignores_high_nibble() {
        let data = [0x00, 0x42, 0xF3, 0x64, 0x01, 0x3C];
        let temp = Temperature::from_bytes(&data).unwrap();
        assert_eq!(temp.channel, 3);
        assert_abs_diff_eq!(temp.temperature, 35.6);
    }

    #[test]
    fn test_temperature_insufficient_data() {
        assert!(Temperature::from_bytes(&[0x00, 0x42, 0x01, 0xD7, 0x00]).is_none());
    }
}
