use chrono::Utc;

use crate::decoder::{DecoderConfig, PacketDecoder};
use crate::error::TransportError;
use crate::framer::PacketFramer;
use crate::record::Record;

/// Source of record timestamps.
pub trait Clock {
    /// Current time in whole seconds since the epoch.
    fn now(&self) -> i64;
}

/// Wall clock, rounded to the nearest second.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        (Utc::now().timestamp_millis() + 500).div_euclid(1000)
    }
}

/// Bytes in, records out.
///
/// Pulls bytes from the source only as records are requested. The first
/// transport error ends the sequence.
pub struct RecordPipeline<S, C = SystemClock>
where
    S: Iterator<Item = Result<u8, TransportError>>,
    C: Clock,
{
    framer: PacketFramer<S>,
    decoder: PacketDecoder,
    clock: C,
}

impl<S> RecordPipeline<S, SystemClock>
where
    S: Iterator<Item = Result<u8, TransportError>>,
{
    pub fn new(source: S, config: DecoderConfig) -> Self {
        Self::with_clock(source, config, SystemClock)
    }
}

impl<S, C> RecordPipeline<S, C>
where
    S: Iterator<Item = Result<u8, TransportError>>,
    C: Clock,
{
    pub fn with_clock(source: S, config: DecoderConfig, clock: C) -> Self {
        Self {
            framer: PacketFramer::new(source),
            decoder: PacketDecoder::new(config),
            clock,
        }
    }

    pub fn framer(&self) -> &PacketFramer<S> {
        &self.framer
    }

    pub fn framer_mut(&mut self) -> &mut PacketFramer<S> {
        &mut self.framer
    }

    pub fn decoder(&self) -> &PacketDecoder {
        &self.decoder
    }

    pub fn decoder_mut(&mut self) -> &mut PacketDecoder {
        &mut self.decoder
    }
}

impl<S, C> Iterator for RecordPipeline<S, C>
where
    S: Iterator<Item = Result<u8, TransportError>>,
    C: Clock,
{
    type Item = Result<Record, TransportError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let packet = match self.framer.next()? {
                Ok(packet) => packet,
                Err(e) => return Some(Err(e)),
            };
            if let Some(record) = self.decoder.decode(packet.data(), self.clock.now()) {
                return Some(Ok(record));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_close_to_now() {
        let now = SystemClock.now();
        assert!((now - Utc::now().timestamp()).abs() <= 1);
    }
}
