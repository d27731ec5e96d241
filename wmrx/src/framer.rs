//! WMR-USB packet framer
//!
//! Turns the raw byte stream of the station into checksum-verified packets.
//! Packets are terminated by a `0xFF 0xFF` marker, and the station pads idle
//! time with `0xFF` filler, so the framer needs one byte of lookahead to tell
//! a marker from payload.
//!
//! # Usage
//!
//! ```no_run
//! use wmrx::PacketFramer;
//!
//! let bytes = vec![0xFFu8, 0xFF /* ... */];
//! for packet in PacketFramer::new(bytes.into_iter().map(Ok)) {
//!     let packet = packet?;
//!     println!("type 0x{:02X}", packet.packet_type());
//! }
//! # Ok::<(), wmrx::TransportError>(())
//! ```

use std::iter::Peekable;
use std::mem;

use tracing::debug;

use crate::error::TransportError;

const FILL: u8 = 0xFF;

/// Real packets are at most 17 bytes; anything far longer lost its marker.
const MAX_BUFFER: usize = 64;

/// Sum of the payload bytes, as carried in the two-byte trailer.
pub fn checksum(payload: &[u8]) -> u32 {
    payload.iter().map(|&b| b as u32).sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumStatus {
    Valid,
    Mismatch { computed: u32, actual: u32 },
    /// Nothing but (at most) a trailer: there is no payload to sum.
    Degenerate,
}

pub fn verify_checksum(buffer: &[u8]) -> ChecksumStatus {
    if buffer.len() <= 2 {
        return ChecksumStatus::Degenerate;
    }
    let (payload, trailer) = buffer.split_at(buffer.len() - 2);
    let computed = checksum(payload);
    let actual = ((trailer[1] as u32) << 8) | trailer[0] as u32;
    if computed == actual {
        ChecksumStatus::Valid
    } else {
        ChecksumStatus::Mismatch { computed, actual }
    }
}

/// A checksum-verified packet, trailer included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    data: Vec<u8>,
}

impl Packet {
    /// Type code of the packet (byte 1).
    pub fn packet_type(&self) -> u8 {
        self.data[1]
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

}

/// Counters kept while framing, for periodic metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FramerStats {
    pub bytes: u64,
    pub packets: u64,
    pub bad_checksums: u64,
    pub degenerate: u64,
}

/// Lazily frames packets out of a byte source.
///
/// Yields `Ok(Packet)` for every valid packet. A transport error is yielded
/// once, after which the framer is exhausted; a new framer must be built on a
/// fresh source to continue.
pub struct PacketFramer<S>
where
    S: Iterator<Item = Result<u8, TransportError>>,
{
    bytes: Peekable<S>,
    synchronized: bool,
    finished: bool,
    stats: FramerStats,
}

impl<S> PacketFramer<S>
where
    S: Iterator<Item = Result<u8, TransportError>>,
{
    pub fn new(source: S) -> Self {
        Self {
            bytes: source.peekable(),
            synchronized: false,
            finished: false,
            stats: FramerStats::default(),
        }
    }

    pub fn stats(&self) -> &FramerStats {
        &self.stats
    }

    /// Return the counters accumulated so far and start over from zero.
    pub fn take_stats(&mut self) -> FramerStats {
        mem::take(&mut self.stats)
    }

    fn next_is_fill(&mut self) -> bool {
        matches!(self.bytes.peek(), Some(Ok(FILL)))
    }

    fn fetch(&mut self) -> Option<Result<u8, TransportError>> {
        let next = self.bytes.next();
        match next {
            Some(Ok(_)) => self.stats.bytes += 1,
            Some(Err(_)) | None => self.finished = true,
        }
        next
    }

    /// Skip idle filler so that the next byte is the start of a packet.
    fn resynchronize(&mut self) {
        while self.next_is_fill() {
            self.bytes.next();
            self.stats.bytes += 1;
        }
        self.synchronized = true;
    }
}

impl<S> Iterator for PacketFramer<S>
where
    S: Iterator<Item = Result<u8, TransportError>>,
{
    type Item = Result<Packet, TransportError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if !self.synchronized {
            self.resynchronize();
        }

        let mut buffer = Vec::with_capacity(17);
        loop {
            let byte = match self.fetch() {
                Some(Ok(byte)) => byte,
                Some(Err(e)) => {
                    if !buffer.is_empty() {
                        debug!("Discarding {} buffered bytes after transport error", buffer.len());
                    }
                    return Some(Err(e));
                }
                None => {
                    if !buffer.is_empty() {
                        debug!("Discarding {} trailing bytes without end marker", buffer.len());
                    }
                    return None;
                }
            };

            if byte != FILL || !self.next_is_fill() {
                buffer.push(byte);
                if buffer.len() > MAX_BUFFER {
                    self.stats.degenerate += 1;
                    debug!("Dropping {} bytes without end marker", buffer.len());
                    buffer.clear();
                }
                continue;
            }

            // End of packet: drop the second marker byte.
            self.bytes.next();
            self.stats.bytes += 1;

            match verify_checksum(&buffer) {
                ChecksumStatus::Valid => {
                    self.stats.packets += 1;
                    return Some(Ok(Packet { data: mem::take(&mut buffer) }));
                }
                ChecksumStatus::Mismatch { computed, actual } => {
                    self.stats.bad_checksums += 1;
                    debug!(
                        "Bad checksum on buffer of length {} (computed 0x{:04X}, received 0x{:04X})",
                        buffer.len(),
                        computed,
                        actual
                    );
                }
                ChecksumStatus::Degenerate => {
                    self.stats.degenerate += 1;
                    debug!("Dropping degenerate buffer of length {}", buffer.len());
                }
            }
            buffer.clear();
        }
    }
}
