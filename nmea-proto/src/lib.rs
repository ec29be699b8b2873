//! NMEA 0183 framing, checksums, and sentence parsing for GPS receivers.
//!
//! This crate provides everything needed to turn the raw serial output of a
//! GPS module into typed position data:
//!
//! - **Types**: sentence payloads
//!   - [`Coordinates`] - Signed decimal-degree position
//!   - [`Gga`], [`Rmc`], [`Gll`] - Decoded sentences
//!   - [`Sentence`] - Any decoded sentence
//!
//! - **Parsing**: incoming data
//!   - [`NmeaParser`] - Byte-at-a-time framer for streaming input
//!   - [`parse_sentence()`] - Parse one complete sentence
//!   - [`checksum()`] - XOR checksum
//!
//! - **Serialization**: outgoing sentences (simulators, test fixtures)
//!   - [`write_sentence()`] - Frame a body with `$`, checksum, and CR LF
//!
//! # Protocol Format
//!
//! ```text
//! $<talker><type>,<field>,<field>,...*<checksum>\r\n
//! ```
//!
//! - `talker` - 2 characters (`GP` GPS, `GN` multi-constellation, `GL` GLONASS, ...)
//! - `type` - 3 characters (`GGA`, `RMC`, `GLL`, ...)
//! - `checksum` - 2 hex digits, XOR of every byte between `$` and `*`
//!
//! # Example
//!
//! ```
//! use nmea_proto::{NmeaParser, Sentence};
//!
//! let mut parser = NmeaParser::new();
//! let mut fix = None;
//!
//! for &byte in b"$GPGLL,4916.45,N,12311.12,W,225444,A*31\r\n" {
//!     if let Ok(Some(sentence)) = parser.push_byte(byte) {
//!         fix = sentence.position();
//!     }
//! }
//!
//! let fix = fix.unwrap();
//! assert!(fix.latitude > 49.0 && fix.longitude < -123.0);
//! ```
//!
//! # UART Configuration
//!
//! Most GPS modules (NEO-6M, MAX-M8Q, ...) default to 9600 baud, 8N1.
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)
//! - **`embedded-io`**: Enable [`write_sentence_io()`] for I/O peripherals
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod checksum;
mod fmt;
pub mod parser;
pub mod sentence;
pub mod serialize;
pub mod types;

// Re-export types at crate root for convenience
pub use checksum::checksum;
pub use parser::{NmeaParser, ParserState, SENTENCE_START};
pub use sentence::{parse_sentence, ParseError, MAX_FIELDS, MAX_SENTENCE_LENGTH};
#[cfg(feature = "embedded-io")]
pub use serialize::write_sentence_io;
pub use serialize::{
    write_sentence, write_sentence_fmt, SerializeError, FRAME_OVERHEAD, MAX_BODY_LENGTH,
    MAX_FRAME_SIZE,
};
pub use types::{Coordinates, Date, FixQuality, Gga, Gll, Rmc, Sentence, UtcTime};
