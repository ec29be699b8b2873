//! FixAccumulator: turns a raw GPS byte stream into position fix snapshots.
//!
//! Bytes are framed by [`NmeaParser`]; every position-bearing sentence that
//! passes its checksum replaces the exposed [`PositionFix`] in one step.
//! Malformed or corrupted input is counted and dropped, never surfaced.

use log::trace;
use nmea_proto::{NmeaParser, ParseError, Sentence};

use crate::fix::PositionFix;

/// Counters for sentences seen by a [`FixAccumulator`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AccumulatorStats {
    /// Sentences that passed checksum and updated the fix.
    pub accepted: u32,
    /// Sentences dropped for a checksum mismatch.
    pub checksum_errors: u32,
    /// Sentences dropped for bad framing or field contents.
    pub malformed: u32,
    /// Sentences dropped for exceeding the buffer.
    pub overflows: u32,
    /// Valid sentences of a type that carries no position (GSV, GSA, ...).
    pub ignored: u32,
}

impl AccumulatorStats {
    /// Total sentences discarded as corrupt.
    #[inline]
    #[must_use]
    pub fn discarded(&self) -> u32 {
        self.checksum_errors
            .saturating_add(self.malformed)
            .saturating_add(self.overflows)
    }

    fn record(&mut self, error: ParseError) {
        let counter = match error {
            ParseError::Checksum => &mut self.checksum_errors,
            ParseError::Malformed => &mut self.malformed,
            ParseError::Overflow => &mut self.overflows,
            ParseError::Unsupported => &mut self.ignored,
        };
        *counter = counter.saturating_add(1);
    }
}

/// Incremental GPS fix decoder.
pub struct FixAccumulator {
    parser: NmeaParser,
    fix: Option<PositionFix>,
    stats: AccumulatorStats,
}

impl FixAccumulator {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            parser: NmeaParser::new(),
            fix: None,
            stats: AccumulatorStats {
                accepted: 0,
                checksum_errors: 0,
                malformed: 0,
                overflows: 0,
                ignored: 0,
            },
        }
    }

    /// Consume one byte. Never blocks and never fails.
    pub fn feed(&mut self, byte: u8) {
        match self.parser.push_byte(byte) {
            Ok(None) => {}
            Ok(Some(sentence)) => self.apply(&sentence),
            Err(e) => {
                trace!("NMEA sentence dropped: {}", e);
                self.stats.record(e);
            }
        }
    }

    /// Consume a batch of bytes.
    pub fn feed_slice(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.feed(b);
        }
    }

    /// Most recent fix, or `None` if no position sentence was ever accepted.
    #[inline]
    #[must_use]
    pub fn current_fix(&self) -> Option<PositionFix> {
        self.fix
    }

    #[inline]
    #[must_use]
    pub fn stats(&self) -> AccumulatorStats {
        self.stats
    }

    /// Update the fix from a checksum-verified sentence.
    ///
    /// Validity always follows the latest sentence. Coordinates are only
    /// replaced when the sentence carries them, and no fix exists until
    /// one does.
    fn apply(&mut self, sentence: &Sentence) {
        self.stats.accepted = self.stats.accepted.saturating_add(1);

        self.fix = match (sentence.position(), self.fix) {
            (Some(coordinates), _) => Some(PositionFix::from_coordinates(
                coordinates,
                sentence.has_fix(),
            )),
            (None, Some(previous)) => Some(PositionFix {
                valid: sentence.has_fix(),
                ..previous
            }),
            (None, None) => None,
        };
    }
}

impl Default for FixAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
