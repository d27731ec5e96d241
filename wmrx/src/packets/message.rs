use std::fmt;

use super::barometer::Barometer;
use super::clock::Clock;
use super::rain::Rain;
use super::temperature::Temperature;
use super::uv::Uv;
use super::wind::Wind;

fn format_data_bytes(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Packet type codes, found at byte 1 of every packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PacketType {
    Rain = 0x41,
    Temperature = 0x42,
    Barometer = 0x46,
    Uv = 0x47,
    Wind = 0x48,
    Clock = 0x60,
}

impl PacketType {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x41 => Some(PacketType::Rain),
            0x42 => Some(PacketType::Temperature),
            0x46 => Some(PacketType::Barometer),
            0x47 => Some(PacketType::Uv),
            0x48 => Some(PacketType::Wind),
            0x60 => Some(PacketType::Clock),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            PacketType::Rain => "rain",
            PacketType::Temperature => "temperature",
            PacketType::Barometer => "barometer",
            PacketType::Uv => "uv",
            PacketType::Wind => "wind",
            PacketType::Clock => "clock",
        }
    }
}

// Enum to hold any decoded packet
#[derive(Debug, Clone, PartialEq)]
pub enum WmrMessage {
    Rain(Rain),
    Temperature(Temperature),
    Barometer(Barometer),
    Uv(Uv),
    Wind(Wind),
    Clock(Clock),
    /// Unrecognized type code, or a packet too short for its type.
    Unknown(u8, Vec<u8>),
}

impl WmrMessage {
    pub fn from_bytes(data: &[u8]) -> Self {
        let code = data.get(1).copied().unwrap_or_default();
        let unknown = || WmrMessage::Unknown(code, data.to_vec());
        match PacketType::from_code(code) {
            Some(PacketType::Rain) => Rain::from_bytes(data)
                .map(WmrMessage::Rain)
                .unwrap_or_else(unknown),
            Some(PacketType::Temperature) => Temperature::from_bytes(data)
                .map(WmrMessage::Temperature)
                .unwrap_or_else(unknown),
            Some(PacketType::Barometer) => Barometer::from_bytes(data)
                .map(WmrMessage::Barometer)
                .unwrap_or_else(unknown),
            Some(PacketType::Uv) => Uv::from_bytes(data)
                .map(WmrMessage::Uv)
                .unwrap_or_else(unknown),
            Some(PacketType::Wind) => Wind::from_bytes(data)
                .map(WmrMessage::Wind)
                .unwrap_or_else(unknown),
            Some(PacketType::Clock) => Clock::from_bytes(data)
                .map(WmrMessage::Clock)
                .unwrap_or_else(unknown),
            None => unknown(),
        }
    }

    pub fn packet_type(&self) -> Option<PacketType> {
        match self {
            WmrMessage::Rain(_) => Some(PacketType::Rain),
            WmrMessage::Temperature(_) => Some(PacketType::Temperature),
            WmrMessage::Barometer(_) => Some(PacketType::Barometer),
            WmrMessage::Uv(_) => Some(PacketType::Uv),
            WmrMessage::Wind(_) => Some(PacketType::Wind),
            WmrMessage::Clock(_) => Some(PacketType::Clock),
            WmrMessage::Unknown(..) => None,
        }
    }
}

impl fmt::Display for WmrMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WmrMessage::Rain(msg) => write!(f, "{}", msg),
            WmrMessage::Temperature(msg) => write!(f, "{}", msg),
            WmrMessage::Barometer(msg) => write!(f, "{}", msg),
            WmrMessage::Uv(msg) => write!(f, "{}", msg),
            WmrMessage::Wind(msg) => write!(f, "{}", msg),
            WmrMessage::Clock(msg) => write!(f, "{}", msg),
            WmrMessage::Unknown(code, data) => {
                write!(f, "Unknown 0x{:02X}: [{}]", code, format_data_bytes(data))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_type_codes() {
        for packet_type in [
            PacketType::Rain,
            PacketType::Temperature,
            PacketType::Barometer,
            PacketType::Uv,
            PacketType::Wind,
            PacketType::Clock,
        ] {
            assert_eq!(PacketType::from_code(packet_type.code()), Some(packet_type));
        }
        assert_eq!(PacketType::from_code(0x43), None);
        assert_eq!(PacketType::Uv.name(), "uv");
        assert_eq!(PacketType::from_code(0x60).map(|t| t.name()), Some("clock"));
    }

    #[test]
    fn test_dispatch_by_type_code() {
        let msg = WmrMessage::from_bytes(&[0x10, 0x47, 0x00, 0x00, 0x00, 0x05, 0x5C, 0x00]);
        assert!(matches!(msg, WmrMessage::Uv(_)));
        assert_eq!(msg.packet_type(), Some(PacketType::Uv));
    }

    #[test]
    fn test_unknown_type_code() {
        let data = [0x00, 0x43, 0x01, 0x02, 0x46, 0x00];
        let msg = WmrMessage::from_bytes(&data);
        assert_eq!(msg, WmrMessage::Unknown(0x43, data.to_vec()));
        assert_eq!(msg.to_string(), "Unknown 0x43: [00 43 01 02 46 00]");
    }

    #[test]
    fn test_short_packet_is_unknown() {
        let msg = WmrMessage::from_bytes(&[0x00, 0x48, 0x01, 0x49, 0x00]);
        assert_eq!(msg, WmrMessage::Unknown(0x48, vec![0x00, 0x48, 0x01, 0x49, 0x00]));
        assert_eq!(msg.packet_type(), None);
    }
}
