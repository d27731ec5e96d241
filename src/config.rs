use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use wmrx::DecoderConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub station: StationConfig,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub udp: UdpConfig,
    #[serde(default)]
    pub logging: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Directory where log files will be stored
    pub directory: String,
    /// Log file name prefix (date will be appended)
    pub file_prefix: String,
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            directory: "./logs".to_string(),
            file_prefix: "wmr_logger".to_string(),
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationConfig {
    /// Station altitude in meters
    pub altitude: f64,
    /// Max age of a wind reading usable for wind chill
    #[serde(default = "default_stale_wind_seconds")]
    pub stale_wind_seconds: i64,
}

fn default_stale_wind_seconds() -> i64 {
    wmrx::decoder::DEFAULT_STALE_WIND_SECONDS
}

impl StationConfig {
    pub fn decoder_config(&self) -> DecoderConfig {
        DecoderConfig::new(self.altitude).with_stale_wind_seconds(self.stale_wind_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// HID device node of the console
    pub path: String,
    /// How long to wait for a report before counting an error
    pub timeout_seconds: f64,
    pub wait_before_retry_seconds: f64,
    /// Consecutive bad reads tolerated before giving up
    pub max_tries: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            path: "/dev/hidraw0".to_string(),
            timeout_seconds: 15.0,
            wait_before_retry_seconds: 5.0,
            max_tries: 3,
        }
    }
}

impl DeviceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_seconds)
    }

    pub fn wait_before_retry(&self) -> Duration {
        Duration::from_secs_f64(self.wait_before_retry_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UdpConfig {
    pub enabled: bool,
    /// Destination address (e.g., "192.168.1.255:22222")
    pub destination: String,
}

impl Default for UdpConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            destination: "255.255.255.255:22222".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.station.altitude.is_finite() {
            return Err("Station altitude must be a finite number of meters".to_string());
        }
        if self.station.stale_wind_seconds < 0 {
            return Err("stale_wind_seconds must not be negative".to_string());
        }
        if !(self.device.timeout_seconds > 0.0) || !(self.device.wait_before_retry_seconds >= 0.0) {
            return Err("Device timeout must be positive and retry wait non-negative".to_string());
        }
        Ok(())
    }
}
