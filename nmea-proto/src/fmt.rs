//! No-std helpers for the hex and decimal fields used by NMEA sentences.

use core::str::FromStr;

/// Hex digits lookup table for fast conversion.
const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Write a u8 as 2 uppercase hex digits.
///
/// Returns the number of bytes written (always 2).
///
/// # Panics
///
/// Panics if `buf.len() < 2`.
#[inline]
pub fn write_hex_u8(buf: &mut [u8], value: u8) -> usize {
    debug_assert!(buf.len() >= 2, "buffer too small for hex u8");
    buf[0] = HEX_DIGITS[(value >> 4) as usize];
    buf[1] = HEX_DIGITS[(value & 0xF) as usize];
    2
}

/// Parse exactly 2 hex characters (either case) as u8.
#[inline]
pub fn parse_hex_u8(s: &[u8]) -> Option<u8> {
    if s.len() != 2 {
        return None;
    }
    let high = hex_digit(s[0])?;
    let low = hex_digit(s[1])?;
    Some((high << 4) | low)
}

/// Convert a hex character to its value.
#[inline]
fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'A'..=b'F' => Some(b - b'A' + 10),
        b'a'..=b'f' => Some(b - b'a' + 10),
        _ => None,
    }
}

/// Parse 2 ASCII digits as u8.
#[inline]
pub fn parse_2digits(s: &[u8]) -> Option<u8> {
    if s.len() != 2 || !s.iter().all(u8::is_ascii_digit) {
        return None;
    }
    Some((s[0] - b'0') * 10 + (s[1] - b'0'))
}

/// Parse an unsigned integer made of ASCII digits only.
#[inline]
pub fn parse_uint(s: &[u8]) -> Option<u32> {
    if s.is_empty() {
        return None;
    }
    let mut value = 0u32;
    for &b in s {
        if !b.is_ascii_digit() {
            return None;
        }
        value = value.checked_mul(10)?.checked_add((b - b'0') as u32)?;
    }
    Some(value)
}

/// Parse a plain decimal number (`[-]digits[.digits]`).
///
/// Rejects the exponent, `inf` and `NaN` spellings that `FromStr` for
/// floats would otherwise accept.
pub fn parse_decimal<T: FromStr>(s: &[u8]) -> Option<T> {
    let digits = s.strip_prefix(b"-").unwrap_or(s);
    if digits.is_empty() || digits == b"." {
        return None;
    }
    let mut seen_dot = false;
    for &b in digits {
        match b {
            b'0'..=b'9' => {}
            b'.' if !seen_dot => seen_dot = true,
            _ => return None,
        }
    }
    core::str::from_utf8(s).ok()?.parse().ok()
}
