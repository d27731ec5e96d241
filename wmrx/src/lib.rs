//! Oregon Scientific WMR-USB protocol library
//!
//! Turns the byte stream of a WMR100-family console into weather records:
//! - Packet framing on `0xFF 0xFF` markers with checksum verification
//! - Typed decoders for rain, temperature, barometer, UV, wind and clock packets
//! - Derived fields (rain delta, dewpoint, heat index, wind chill, altimeter)
//! - A lazy pipeline from bytes to records
//!
//! # Example
//!
//! ```no_run
//! use wmrx::{DecoderConfig, RecordPipeline};
//!
//! let bytes: Vec<u8> = Vec::new(); // raw bytes from the console
//! let pipeline = RecordPipeline::new(bytes.into_iter().map(Ok), DecoderConfig::new(120.0));
//! for record in pipeline {
//!     println!("{}", record?);
//! }
//! # Ok::<(), wmrx::TransportError>(())
//! ```

pub mod decoder;
pub mod error;
pub mod formulas;
pub mod framer;
pub mod packets;
pub mod pipeline;
pub mod record;
pub mod record_handler;

// Re-export commonly used types
pub use decoder::{DecoderConfig, DecoderState, DecoderStats, PacketDecoder};
pub use error::TransportError;
pub use framer::{FramerStats, Packet, PacketFramer};
pub use packets::{PacketType, WmrMessage};
pub use pipeline::{Clock, RecordPipeline, SystemClock};
pub use record::{Record, UnitSystem};
pub use record_handler::RecordHandler;
