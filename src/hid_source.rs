use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind, Read, Write};
use std::os::fd::AsFd;
use std::time::Duration;

use nix::poll::{PollFd, PollFlags, PollTimeout, poll};
use tracing::{debug, error, info, warn};
use wmrx::TransportError;

use crate::config::DeviceConfig;

/// The console sends fixed-size 8-byte input reports.
const REPORT_LEN: usize = 8;

/// Only needed after a reset or power failure of the station, but harmless
/// otherwise.
const WAKEUP_REPORT: [u8; REPORT_LEN] = [0x20, 0x00, 0x08, 0x01, 0x00, 0x00, 0x00, 0x00];

/// Valid bytes of a report: byte 0 holds how many of the following bytes
/// carry data.
pub fn report_payload(report: &[u8]) -> Option<&[u8]> {
    let count = *report.first()? as usize;
    report.get(1..=count)
}

/// Byte source reading the console through its HID device node.
///
/// Owns the device handle for the whole session; the handle is released when
/// the source is dropped.
pub struct HidReportSource {
    device: File,
    config: DeviceConfig,
    pending: VecDeque<u8>,
    consecutive_errors: u32,
    failed: bool,
}

impl HidReportSource {
    /// Opens the device and wakes the console up.
    pub fn open(config: &DeviceConfig) -> Result<Self, TransportError> {
        let device = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&config.path)
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => TransportError::DeviceNotFound(config.path.clone()),
                _ => TransportError::Io(e),
            })?;
        info!("Opened HID device {}", config.path);

        let mut source = Self {
            device,
            config: config.clone(),
            pending: VecDeque::with_capacity(REPORT_LEN),
            consecutive_errors: 0,
            failed: false,
        };
        source.wake_up()?;
        Ok(source)
    }

    /// Opens the device, retrying until it succeeds.
    pub fn open_with_retry(config: &DeviceConfig) -> Self {
        loop {
            match Self::open(config) {
                Ok(source) => return source,
                Err(e) => {
                    warn!("Failed to open station on '{}': {}", config.path, e);
                    warn!("Retrying in 10 seconds...");
                    std::thread::sleep(Duration::from_secs(10));
                }
            }
        }
    }

    fn wake_up(&mut self) -> Result<(), TransportError> {
        // hidraw expects the report number first; the console uses none
        let mut report = [0u8; REPORT_LEN + 1];
        report[1..].copy_from_slice(&WAKEUP_REPORT);
        self.device.write_all(&report).map_err(|e| {
            error!("Unable to send wake-up report: {}", e);
            TransportError::Wakeup(e)
        })
    }

    fn wait_readable(&self) -> io::Result<bool> {
        let timeout_ms = self.config.timeout().as_millis().min(u16::MAX as u128) as u16;
        let mut fds = [PollFd::new(self.device.as_fd(), PollFlags::POLLIN)];
        let ready = poll(&mut fds, PollTimeout::from(timeout_ms))?;
        Ok(ready > 0)
    }

    fn read_report(&mut self) -> io::Result<Vec<u8>> {
        if !self.wait_readable()? {
            return Err(io::Error::new(ErrorKind::TimedOut, "no report before timeout"));
        }
        let mut report = [0u8; REPORT_LEN];
        let len = self.device.read(&mut report)?;
        report_payload(&report[..len])
            .map(|payload| payload.to_vec())
            .ok_or_else(|| io::Error::new(ErrorKind::InvalidData, format!("malformed report {:02X?}", &report[..len])))
    }
}

impl Iterator for HidReportSource {
    type Item = Result<u8, TransportError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            if let Some(byte) = self.pending.pop_front() {
                return Some(Ok(byte));
            }
            match self.read_report() {
                Ok(payload) => {
                    self.consecutive_errors = 0;
                    self.pending.extend(payload);
                }
                Err(e) => {
                    debug!("Bad USB report received: {}", e);
                    self.consecutive_errors += 1;
                    if self.consecutive_errors > self.config.max_tries {
                        error!("Max retries exceeded while fetching USB reports");
                        self.failed = true;
                        return Some(Err(TransportError::RetriesExceeded(self.config.max_tries)));
                    }
                    std::thread::sleep(self.config.wait_before_retry());
                }
            }
        }
    }
}
