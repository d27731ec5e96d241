use std::net::UdpSocket;
use tracing::{debug, error, warn};
use wmrx::{Record, RecordHandler};

/// UDP broadcaster for weather records
///
/// Serializes every record to a flat JSON object and sends it over UDP to a
/// configured destination address.
pub struct UdpBroadcaster {
    socket: Option<UdpSocket>,
    destination: String,
    error_count: u64,
    message_count: u64,
}

impl UdpBroadcaster {
    /// Create a new UDP broadcaster
    ///
    /// # Arguments
    /// * `destination` - UDP destination address (e.g., "192.168.1.255:22222")
    /// * `enabled` - Whether UDP broadcasting is enabled
    pub fn new(destination: String, enabled: bool) -> Self {
        let socket = if enabled {
            match Self::create_socket(&destination) {
                Ok(sock) => {
                    debug!("UDP broadcaster initialized: {}", destination);
                    Some(sock)
                }
                Err(e) => {
                    error!("Failed to create UDP socket: {}. Broadcasting disabled.", e);
                    None
                }
            }
        } else {
            debug!("UDP broadcaster disabled in configuration");
            None
        };

        Self {
            socket,
            destination,
            error_count: 0,
            message_count: 0,
        }
    }

    /// Create and configure a UDP socket
    fn create_socket(destination: &str) -> Result<UdpSocket, std::io::Error> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;

        // Enable broadcast if destination is a broadcast address
        if destination.contains(".255") {
            socket.set_broadcast(true)?;
        }

        // Never hold up the read loop
        socket.set_nonblocking(true)?;

        Ok(socket)
    }

    pub fn is_enabled(&self) -> bool {
        self.socket.is_some()
    }

    pub fn message_count(&self) -> u64 {
        self.message_count
    }

    fn note_error(&mut self, what: &str, e: &dyn std::fmt::Display) {
        if self.error_count < 10 {
            warn!("{}: {}", what, e);
        }
        self.error_count += 1;
    }

    fn broadcast_record(&mut self, record: &Record) {
        if self.socket.is_none() {
            return;
        }

        let json = match record.to_json() {
            Ok(json) => json,
            Err(e) => {
                self.note_error("Failed to convert record to JSON", &e);
                return;
            }
        };

        let Some(socket) = self.socket.as_ref() else {
            return;
        };
        match socket.send_to(json.as_bytes(), &self.destination) {
            Ok(_) => {
                self.message_count += 1;
                if self.message_count % 1000 == 0 {
                    debug!("Broadcasted {} records via UDP", self.message_count);
                }
            }
            Err(e) => self.note_error("Failed to send UDP packet", &e),
        }
    }
}

impl RecordHandler for UdpBroadcaster {
    fn handle_record(&mut self, record: &Record) {
        self.broadcast_record(record);
    }
}
