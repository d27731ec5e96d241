use std::mem;

use chrono::NaiveDateTime;
use tracing::debug;

use crate::formulas;
use crate::packets::{Barometer, PacketType, Rain, Temperature, Uv, Wind, WmrMessage};
use crate::record::{Record, UnitSystem};

pub const DEFAULT_STALE_WIND_SECONDS: i64 = 30;

/// Station parameters the decoder needs for derived fields.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoderConfig {
    /// Station altitude in meters
    pub altitude: f64,
    /// Max age of a wind reading still usable for wind chill
    pub stale_wind_seconds: i64,
}

impl DecoderConfig {
    pub fn new(altitude: f64) -> Self {
        Self {
            altitude,
            stale_wind_seconds: DEFAULT_STALE_WIND_SECONDS,
        }
    }

    pub fn with_stale_wind_seconds(mut self, seconds: i64) -> Self {
        self.stale_wind_seconds = seconds;
        self
    }
}

/// Cross-packet context of one session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecoderState {
    /// Cumulative rain of the last rain packet, in inches
    pub last_total_rain: Option<f64>,
    /// Last wind record produced, stamped with its own `date_time`
    pub last_wind_record: Option<Record>,
    /// Console clock from the last clock packet
    pub last_device_time: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecoderStats {
    pub records: u64,
    pub unknown_packets: u64,
}

/// Decodes validated packets into records, one packet at a time, in arrival
/// order.
pub struct PacketDecoder {
    config: DecoderConfig,
    state: DecoderState,
    stats: DecoderStats,
}

impl PacketDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            config,
            state: DecoderState::default(),
            stats: DecoderStats::default(),
        }
    }

    pub fn state(&self) -> &DecoderState {
        &self.state
    }

    pub fn last_device_time(&self) -> Option<NaiveDateTime> {
        self.state.last_device_time
    }

    pub fn stats(&self) -> &DecoderStats {
        &self.stats
    }

    pub fn take_stats(&mut self) -> DecoderStats {
        mem::take(&mut self.stats)
    }

    /// Decode one validated packet received at `now` (seconds since epoch).
    ///
    /// Returns `None` for clock packets and for packets that are not
    /// understood.
    pub fn decode(&mut self, packet: &[u8], now: i64) -> Option<Record> {
        let message = WmrMessage::from_bytes(packet);
        self.decode_message(&message, now)
    }

    pub fn decode_message(&mut self, message: &WmrMessage, now: i64) -> Option<Record> {
        let record = match message {
            WmrMessage::Rain(rain) => self.rain_record(rain, now),
            WmrMessage::Temperature(temp) => self.temperature_record(temp, now),
            WmrMessage::Barometer(baro) => self.barometer_record(baro, now),
            WmrMessage::Uv(uv) => uv_record(uv, now),
            WmrMessage::Wind(wind) => self.wind_record(wind, now),
            WmrMessage::Clock(clock) => {
                debug!("{}", clock);
                self.state.last_device_time = Some(clock.date_time);
                return None;
            }
            WmrMessage::Unknown(code, data) => {
                match PacketType::from_code(*code) {
                    Some(packet_type) => debug!("Dropping short {} packet ({} bytes)", packet_type.name(), data.len()),
                    None => debug!("Ignoring packet type 0x{:02X} ({} bytes)", code, data.len()),
                }
                self.stats.unknown_packets += 1;
                return None;
            }
        };
        self.stats.records += 1;
        Some(record)
    }

    fn rain_record(&mut self, rain: &Rain, now: i64) -> Record {
        let mut record = Record::new(now, UnitSystem::Us);
        record.insert("rainRate", rain.rate);
        record.insert("hourRain", rain.hour);
        record.insert("dayRain", rain.day);
        record.insert("totalRain", rain.total);
        record.insert("rainBatteryStatus", rain.battery_status as f64);

        // There are no bucket tips, so rain is the change in the total;
        // the first packet of a session has nothing to compare against.
        record.insert_opt("rain", self.state.last_total_rain.map(|last| rain.total - last));
        self.state.last_total_rain = Some(rain.total);
        record
    }

    fn temperature_record(&self, temp: &Temperature, now: i64) -> Record {
        let mut record = Record::new(now, UnitSystem::Metric);
        let t = temp.temperature;
        let rh = temp.humidity;
        match temp.channel {
            0 => {
                record.insert("inTemp", t);
                record.insert("inHumidity", rh);
                record.insert("inTempBatteryStatus", temp.battery_status as f64);
            }
            1 => {
                record.insert("outTemp", t);
                record.insert("outHumidity", rh);
                record.insert_opt("dewpoint", formulas::dewpoint_c(t, rh));
                record.insert("heatindex", formulas::heatindex_c(t, rh));
                record.insert_opt("windchill", self.recent_wind_speed(now).map(|v| formulas::windchill_c(t, v)));
                record.insert("outTempBatteryStatus", temp.battery_status as f64);
            }
            channel => {
                record.insert(format!("extraTemp{}", channel), t);
                record.insert(format!("extraHumid{}", channel), rh);
            }
        }
        record
    }

    /// Wind speed of the last wind record, unless it has gone stale.
    fn recent_wind_speed(&self, now: i64) -> Option<f64> {
        let wind = self.state.last_wind_record.as_ref()?;
        if now - wind.date_time > self.config.stale_wind_seconds {
            return None;
        }
        wind.get("windSpeed")
    }

    fn barometer_record(&self, baro: &Barometer, now: i64) -> Record {
        let mut record = Record::new(now, UnitSystem::Metric);
        record.insert("pressure", baro.station_pressure);
        record.insert("barometer", baro.sea_level_pressure);
        record.insert_opt(
            "altimeter",
            formulas::altimeter_pressure_metric(baro.station_pressure, self.config.altitude),
        );
        record
    }

    fn wind_record(&mut self, wind: &Wind, now: i64) -> Record {
        let mut record = Record::new(now, UnitSystem::Metric);
        record.insert("windSpeed", wind.speed);
        record.insert("windDir", wind.direction);
        record.insert("windBatteryStatus", wind.battery_status as f64);
        record.insert_opt("windGust", wind.valid_gust());
        self.state.last_wind_record = Some(record.clone());
        record
    }
}

fn uv_record(uv: &Uv, now: i64) -> Record {
    let mut record = Record::new(now, UnitSystem::Metric);
    record.insert("UV", uv.index);
    record.insert("UVBatteryStatus", uv.battery_status as f64);
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const NOW: i64 = 1_700_000_000;

    fn decoder() -> PacketDecoder {
        PacketDecoder::new(DecoderConfig::new(100.0))
    }

    fn rain_packet(total_hundredths: u16) -> Vec<u8> {
        let [lo, hi] = total_hundredths.to_le_bytes();
        vec![0x10, 0x41, 0x04, 0x00, 0x10, 0x00, 0x64, 0x00, lo, hi, 0x00, 0x00]
    }

    // 5.0°C outdoor at 80%
    const OUTDOOR: [u8; 7] = [0x00, 0x42, 0x01, 0x32, 0x00, 0x50, 0x00];
    // 36 km/h (100 in 0.1 m/s), gust 43.2 km/h
    const WIND: [u8; 7] = [0x00, 0x48, 0x04, 0x00, 0x78, 0x40, 0x06];

    #[test]
    fn test_first_rain_has_no_delta() {
        let mut decoder = decoder();
        let record = decoder.decode(&rain_packet(200), NOW).unwrap();
        assert_eq!(record.us_units, UnitSystem::Us);
        assert_eq!(record.date_time, NOW);
        assert_abs_diff_eq!(record.get("rainRate").unwrap(), 0.04);
        assert_abs_diff_eq!(record.get("hourRain").unwrap(), 0.16);
        assert_abs_diff_eq!(record.get("dayRain").unwrap(), 1.0);
        assert_abs_diff_eq!(record.get("totalRain").unwrap(), 2.0);
        assert_eq!(record.get("rainBatteryStatus"), Some(1.0));
        assert!(!record.contains("rain"));
        assert_eq!(decoder.state().last_total_rain, Some(2.0));
    }

    #[test]
    fn test_rain_delta() {
        let mut decoder = decoder();
        decoder.decode(&rain_packet(200), NOW);
        let record = decoder.decode(&rain_packet(204), NOW + 60).unwrap();
        assert_abs_diff_eq!(record.get("rain").unwrap(), 0.04, epsilon = 1e-9);
        assert_eq!(decoder.state().last_total_rain, Some(2.04));

        let record = decoder.decode(&rain_packet(204), NOW + 120).unwrap();
        assert_abs_diff_eq!(record.get("rain").unwrap(), 0.0);
    }

    #[test]
    fn test_indoor_temperature() {
        let mut decoder = decoder();
        let record = decoder.decode(&[0x40, 0x42, 0x00, 0xD7, 0x00, 0x2D, 0x00], NOW).unwrap();
        assert_eq!(record.us_units, UnitSystem::Metric);
        assert_abs_diff_eq!(record.get("inTemp").unwrap(), 21.5);
        assert_abs_diff_eq!(record.get("inHumidity").unwrap(), 45.0);
        assert_eq!(record.get("inTempBatteryStatus"), Some(1.0));
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn test_outdoor_temperature_without_wind() {
        let mut decoder = decoder();
        let record = decoder.decode(&OUTDOOR, NOW).unwrap();
        assert_abs_diff_eq!(record.get("outTemp").unwrap(), 5.0);
        assert_abs_diff_eq!(record.get("outHumidity").unwrap(), 80.0);
        assert_abs_diff_eq!(record.get("dewpoint").unwrap(), 1.83, epsilon = 0.05);
        assert_abs_diff_eq!(record.get("heatindex").unwrap(), 5.0, epsilon = 1e-9);
        assert_eq!(record.get("outTempBatteryStatus"), Some(0.0));
        assert!(!record.contains("windchill"));
    }

    #[test]
    fn test_extra_channel_temperature() {
        let mut decoder = decoder();
        let record = decoder.decode(&[0x00, 0x42, 0x03, 0x2C, 0x81, 0x37], NOW).unwrap();
        assert_abs_diff_eq!(record.get("extraTemp3").unwrap(), -30.0);
        assert_abs_diff_eq!(record.get("extraHumid3").unwrap(), 55.0);
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_windchill_uses_recent_wind() {
        let mut decoder = decoder();
        decoder.decode(&WIND, NOW).unwrap();
        let record = decoder.decode(&OUTDOOR, NOW + 30).unwrap();
        let expected = formulas::windchill_c(5.0, 36.0);
        assert_abs_diff_eq!(record.get("windchill").unwrap(), expected, epsilon = 1e-9);
        assert!(expected < 5.0);
    }

    #[test]
    fn test_windchill_absent_when_wind_is_stale() {
        let mut decoder = decoder();
        decoder.decode(&WIND, NOW).unwrap();
        let record = decoder.decode(&OUTDOOR, NOW + 31).unwrap();
        assert!(!record.contains("windchill"));
    }

    #[test]
    fn test_configurable_stale_window() {
        let mut decoder = PacketDecoder::new(DecoderConfig::new(0.0).with_stale_wind_seconds(120));
        decoder.decode(&WIND, NOW).unwrap();
        assert!(decoder.decode(&OUTDOOR, NOW + 90).unwrap().contains("windchill"));
    }

    #[test]
    fn test_wind_record_and_state() {
        let mut decoder = decoder();
        let record = decoder.decode(&WIND, NOW).unwrap();
        assert_abs_diff_eq!(record.get("windSpeed").unwrap(), 36.0, epsilon = 1e-9);
        assert_abs_diff_eq!(record.get("windGust").unwrap(), 43.2, epsilon = 1e-9);
        assert_abs_diff_eq!(record.get("windDir").unwrap(), 90.0);
        assert_eq!(record.get("windBatteryStatus"), Some(0.0));
        assert_eq!(decoder.state().last_wind_record.as_ref(), Some(&record));
    }

    #[test]
    fn test_wind_gust_below_speed_is_suppressed() {
        let mut decoder = decoder();
        // speed 100, gust 0x050 = 80
        let record = decoder.decode(&[0x00, 0x48, 0x04, 0x00, 0x50, 0x40, 0x06], NOW).unwrap();
        assert!(!record.contains("windGust"));
        assert!(record.contains("windSpeed"));
    }

    #[test]
    fn test_barometer_record() {
        let mut decoder = PacketDecoder::new(DecoderConfig::new(0.0));
        let record = decoder.decode(&[0x00, 0x46, 0xF5, 0x33, 0xF9, 0x03], NOW).unwrap();
        assert_eq!(record.get("pressure"), Some(1013.0));
        assert_eq!(record.get("barometer"), Some(1017.0));
        assert_abs_diff_eq!(record.get("altimeter").unwrap(), 1012.7, epsilon = 1e-9);
    }

    #[test]
    fn test_uv_record() {
        let mut decoder = decoder();
        let record = decoder.decode(&[0x30, 0x47, 0x00, 0x00, 0x00, 0x07, 0x00], NOW).unwrap();
        assert_eq!(record.get("UV"), Some(7.0));
        assert_eq!(record.get("UVBatteryStatus"), Some(3.0));
        assert_eq!(record.us_units, UnitSystem::Metric);
    }

    #[test]
    fn test_clock_packet_sets_device_time_only() {
        let mut decoder = decoder();
        let packet = [0x00, 0x60, 0x00, 0x00, 0x1E, 0x0E, 0x13, 0x0A, 0x1A, 0x00, 0x00];
        assert!(decoder.decode(&packet, NOW).is_none());
        let expected = chrono::NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        assert_eq!(decoder.last_device_time(), Some(expected));
        assert_eq!(decoder.stats().records, 0);
    }

    #[test]
    fn test_unknown_packet_leaves_state_unchanged() {
        let mut decoder = decoder();
        decoder.decode(&rain_packet(200), NOW);
        decoder.decode(&WIND, NOW);
        let before = decoder.state().clone();

        assert!(decoder.decode(&[0x00, 0x43, 0x01, 0x02, 0x46, 0x00], NOW).is_none());
        // Known type, but too short to decode
        assert!(decoder.decode(&[0x00, 0x41, 0x04, 0x00, 0x45, 0x00], NOW).is_none());

        assert_eq!(decoder.state(), &before);
        assert_eq!(decoder.stats().unknown_packets, 2);
        assert_eq!(decoder.take_stats().records, 2);
        assert_eq!(decoder.stats(), &DecoderStats::default());
    }
}
