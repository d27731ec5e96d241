use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Uv {
    pub battery_status: u8,
    pub index: f64,
}

impl Uv {
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 6 {
            return None;
        }
        Some(Self {
            battery_status: data[0] >> 4,
            index: data[5] as f64,
        })
    }
}

impl fmt::Display for Uv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "UV index: {:.0} (Battery: {})", self.index, self.battery_status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uv_from_bytes() {
        let uv = Uv::from_bytes(&[0x10, 0x47, 0x00, 0x00, 0x00, 0x05]).unwrap();
        assert_eq!(uv.battery_status, 1);
        assert_eq!(uv.index, 5.0);
    }
}
