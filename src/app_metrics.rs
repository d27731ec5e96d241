use std::time::{Duration, Instant};
use tracing::info;

use wmrx::{DecoderStats, FramerStats};

/// Application-level counters for the byte stream and the decoding pipeline
/// (not to be confused with the weather values themselves)
pub struct AppMetrics {
    /// Number of bytes read from the console
    pub bytes: u64,
    /// Number of packets that passed the checksum
    pub packets: u64,
    /// Number of buffers dropped for a bad checksum
    pub bad_checksums: u64,
    /// Number of empty buffers between markers
    pub degenerate_packets: u64,
    /// Number of valid packets with no decoder
    pub unknown_packets: u64,
    /// Number of records produced
    pub records: u64,
    /// Number of sessions ended by a transport error
    pub transport_errors: u64,
}

impl AppMetrics {
    /// Create a new AppMetrics instance with all counters at zero
    pub fn new() -> Self {
        Self {
            bytes: 0,
            packets: 0,
            bad_checksums: 0,
            degenerate_packets: 0,
            unknown_packets: 0,
            records: 0,
            transport_errors: 0,
        }
    }

    pub fn add_framer_stats(&mut self, stats: &FramerStats) {
        self.bytes += stats.bytes;
        self.packets += stats.packets;
        self.bad_checksums += stats.bad_checksums;
        self.degenerate_packets += stats.degenerate;
    }

    pub fn add_decoder_stats(&mut self, stats: &DecoderStats) {
        self.records += stats.records;
        self.unknown_packets += stats.unknown_packets;
    }

    /// Reset all counters to zero
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Log current metrics to the info log
    pub fn log(&self) {
        info!(
            "[Metrics] Bytes: {}, Packets: {}, Bad checksums: {}, Empty packets: {}, Unknown packets: {}, Records: {}, Transport errors: {}",
            self.bytes,
            self.packets,
            self.bad_checksums,
            self.degenerate_packets,
            self.unknown_packets,
            self.records,
            self.transport_errors
        );
    }
}

impl Default for AppMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Manages periodic logging of application metrics
pub struct MetricsLogger {
    last_log: Instant,
    log_interval: Duration,
}

impl MetricsLogger {
    /// Create a new MetricsLogger with the specified logging interval
    pub fn new(log_interval: Duration) -> Self {
        Self {
            last_log: Instant::now(),
            log_interval,
        }
    }

    /// Check if it's time to log metrics, and if so, log them and reset
    /// Returns true if metrics were logged
    pub fn check_and_log(&mut self, metrics: &mut AppMetrics) -> bool {
        if self.last_log.elapsed() >= self.log_interval {
            metrics.log();
            metrics.reset();
            self.last_log = Instant::now();
            true
        } else {
            false
        }
    }
}
