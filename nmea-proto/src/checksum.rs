//! NMEA 0183 checksum.
//!
//! The checksum is the XOR of every byte between the leading `$` and the `*`
//! delimiter, transmitted as two hex digits.

/// Calculate the XOR checksum of a byte slice.
#[inline]
#[must_use]
pub fn checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, &b| acc ^ b)
}
