//! Byte-at-a-time NMEA sentence framer.
//!
//! Reassembles sentences from a raw serial stream and hands each complete
//! frame to [`parse_sentence`]. The buffer is bounded: a sentence that never
//! terminates is dropped once it exceeds [`MAX_SENTENCE_LENGTH`].

use heapless::Vec;

use crate::sentence::{parse_sentence, ParseError, MAX_SENTENCE_LENGTH};
use crate::types::Sentence;

/// Sentence start delimiter.
pub const SENTENCE_START: u8 = b'$';

/// Framer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParserState {
    /// Skipping bytes until a `$` is seen.
    AwaitingStart,
    /// Buffering sentence bytes until the LF terminator.
    AccumulatingSentence,
    /// Terminator seen; checksum and fields are being verified.
    ValidatingChecksum,
}

/// NMEA sentence framer.
pub struct NmeaParser {
    buffer: Vec<u8, MAX_SENTENCE_LENGTH>,
    state: ParserState,
}

impl NmeaParser {
    /// Create a new parser.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            state: ParserState::AwaitingStart,
        }
    }

    /// Reset parser state, dropping any partial sentence.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.state = ParserState::AwaitingStart;
    }

    /// Current framer state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Feed a byte to the parser.
    ///
    /// Returns `Ok(Some(sentence))` when a complete valid sentence was parsed,
    /// `Ok(None)` while more bytes are needed, and an error when a buffered
    /// sentence had to be dropped. The parser is always ready for the next
    /// byte after an error.
    pub fn push_byte(&mut self, byte: u8) -> Result<Option<Sentence>, ParseError> {
        match self.state {
            ParserState::AwaitingStart | ParserState::ValidatingChecksum => {
                if byte == SENTENCE_START {
                    self.begin();
                } else {
                    self.state = ParserState::AwaitingStart;
                }
                Ok(None)
            }
            ParserState::AccumulatingSentence => match byte {
                SENTENCE_START => {
                    // New sentence started before the previous one terminated
                    self.begin();
                    Err(ParseError::Malformed)
                }
                b'\n' => {
                    self.state = ParserState::ValidatingChecksum;
                    let result = parse_sentence(&self.buffer);
                    self.reset();
                    result.map(Some)
                }
                b'\r' => Ok(None),
                0x20..=0x7E => {
                    if self.buffer.push(byte).is_err() {
                        self.reset();
                        return Err(ParseError::Overflow);
                    }
                    Ok(None)
                }
                _ => {
                    // Non-printable byte: line noise or a baud mismatch
                    self.reset();
                    Err(ParseError::Malformed)
                }
            },
        }
    }

    /// Start buffering a new sentence with its `$` delimiter.
    fn begin(&mut self) {
        self.buffer.clear();
        // Capacity is never zero, so the delimiter always fits.
        let _ = self.buffer.push(SENTENCE_START);
        self.state = ParserState::AccumulatingSentence;
    }
}

impl Default for NmeaParser {
    fn default() -> Self {
        Self::new()
    }
}
