//! Parser for complete NMEA 0183 sentences.
//!
//! Supported sentence types (any talker ID, e.g. `GP`, `GN`, `GL`):
//! - GGA: `$--GGA,hhmmss.ss,llll.ll,a,yyyyy.yy,a,q,nn,h.h,a.a,M,g.g,M,,*hh`
//! - RMC: `$--RMC,hhmmss.ss,A,llll.ll,a,yyyyy.yy,a,s.s,c.c,ddmmyy,,,a*hh`
//! - GLL: `$--GLL,llll.ll,a,yyyyy.yy,a,hhmmss.ss,A,a*hh`

use heapless::Vec;

use crate::checksum::checksum;
use crate::fmt::{parse_2digits, parse_decimal, parse_hex_u8, parse_uint};
use crate::types::{Coordinates, Date, FixQuality, Gga, Gll, Rmc, Sentence, UtcTime};

/// Maximum sentence length from NMEA 0183, `$` through the checksum
/// (the CR LF terminator is never buffered).
pub const MAX_SENTENCE_LENGTH: usize = 82;

/// Maximum number of comma-separated fields (address field included).
pub const MAX_FIELDS: usize = 24;

/// Shortest frame that can carry an address and a checksum: `$GPXXX*hh`
const MIN_SENTENCE_LEN: usize = 9;

/// Address field length: 2-char talker ID + 3-char sentence type.
const ADDRESS_LEN: usize = 5;

type Fields<'a> = Vec<&'a [u8], MAX_FIELDS>;

/// Parse error for incoming sentences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Framing or field contents are invalid.
    Malformed,
    /// Checksum mismatch.
    Checksum,
    /// Well-formed sentence of a type this crate does not decode.
    Unsupported,
    /// Sentence exceeded [`MAX_SENTENCE_LENGTH`] before its terminator.
    Overflow,
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed sentence"),
            Self::Checksum => write!(f, "checksum mismatch"),
            Self::Unsupported => write!(f, "unsupported sentence type"),
            Self::Overflow => write!(f, "sentence too long"),
        }
    }
}

/// Parse a complete sentence, `$` through checksum.
///
/// A trailing CR and/or LF is ignored.
///
/// # Example
///
/// ```
/// use nmea_proto::{parse_sentence, Sentence};
///
/// let line = b"$GPGLL,4916.45,N,12311.12,W,225444,A*31\r\n";
/// if let Ok(Sentence::Gll(gll)) = parse_sentence(line) {
///     assert!(gll.active);
/// }
/// ```
pub fn parse_sentence(line: &[u8]) -> Result<Sentence, ParseError> {
    let line = strip_line_ending(line);

    if line.first() != Some(&b'$') {
        return Err(ParseError::Malformed);
    }

    let payload = extract_verified_payload(line)?;
    let fields = split_fields(payload)?;

    let address = fields[0];
    // Proprietary sentences ($P<mfr>...) are valid but not decoded.
    if address.first() == Some(&b'P') {
        return Err(ParseError::Unsupported);
    }
    if address.len() != ADDRESS_LEN || !address.iter().all(u8::is_ascii_alphanumeric) {
        return Err(ParseError::Malformed);
    }

    match &address[2..] {
        b"GGA" => parse_gga(&fields).map(Sentence::Gga),
        b"RMC" => parse_rmc(&fields).map(Sentence::Rmc),
        b"GLL" => parse_gll(&fields).map(Sentence::Gll),
        _ => Err(ParseError::Unsupported),
    }
}

/// GGA sentence (Global Positioning System Fix Data).
fn parse_gga(fields: &Fields<'_>) -> Result<Gga, ParseError> {
    if fields.len() < 10 {
        return Err(ParseError::Malformed);
    }

    let quality = optional(fields[6], parse_u8)?
        .map(FixQuality::from)
        .unwrap_or_default();

    Ok(Gga {
        time: optional(fields[1], parse_time)?,
        position: parse_position(fields[2], fields[3], fields[4], fields[5])?,
        quality,
        satellites: optional(fields[7], parse_u8)?,
        hdop: optional(fields[8], parse_decimal)?,
        altitude_m: optional(fields[9], parse_decimal)?,
    })
}

/// RMC sentence (Recommended Minimum Navigation Information).
fn parse_rmc(fields: &Fields<'_>) -> Result<Rmc, ParseError> {
    if fields.len() < 10 {
        return Err(ParseError::Malformed);
    }

    Ok(Rmc {
        time: optional(fields[1], parse_time)?,
        active: parse_status(fields[2])?,
        position: parse_position(fields[3], fields[4], fields[5], fields[6])?,
        speed_knots: optional(fields[7], parse_decimal)?,
        course_deg: optional(fields[8], parse_decimal)?,
        date: optional(fields[9], parse_date)?,
    })
}

/// GLL sentence (Geographic Position).
fn parse_gll(fields: &Fields<'_>) -> Result<Gll, ParseError> {
    if fields.len() < 7 {
        return Err(ParseError::Malformed);
    }

    Ok(Gll {
        position: parse_position(fields[1], fields[2], fields[3], fields[4])?,
        time: optional(fields[5], parse_time)?,
        active: parse_status(fields[6])?,
    })
}

/// Strip trailing CR and/or LF from a line.
#[inline]
fn strip_line_ending(line: &[u8]) -> &[u8] {
    let mut end = line.len();
    if end > 0 && line[end - 1] == b'\n' {
        end -= 1;
    }
    if end > 0 && line[end - 1] == b'\r' {
        end -= 1;
    }
    &line[..end]
}

/// Verify the `*hh` trailer and return the bytes between `$` and `*`.
#[inline]
fn extract_verified_payload(line: &[u8]) -> Result<&[u8], ParseError> {
    if line.len() < MIN_SENTENCE_LEN {
        return Err(ParseError::Malformed);
    }

    let checksum_pos = line
        .iter()
        .rposition(|&b| b == b'*')
        .ok_or(ParseError::Malformed)?;

    if checksum_pos + 3 != line.len() {
        return Err(ParseError::Malformed);
    }

    let payload = &line[1..checksum_pos];
    let received = parse_hex_u8(&line[checksum_pos + 1..]).ok_or(ParseError::Malformed)?;

    if checksum(payload) != received {
        return Err(ParseError::Checksum);
    }

    Ok(payload)
}

fn split_fields(payload: &[u8]) -> Result<Fields<'_>, ParseError> {
    let mut fields = Fields::new();
    for field in payload.split(|&b| b == b',') {
        fields.push(field).map_err(|_| ParseError::Malformed)?;
    }
    Ok(fields)
}

/// Empty fields are `None`; non-empty fields must parse.
#[inline]
fn optional<T>(field: &[u8], parse: impl Fn(&[u8]) -> Option<T>) -> Result<Option<T>, ParseError> {
    if field.is_empty() {
        return Ok(None);
    }
    parse(field).map(Some).ok_or(ParseError::Malformed)
}

fn parse_u8(s: &[u8]) -> Option<u8> {
    parse_uint(s).and_then(|v| u8::try_from(v).ok())
}

/// Status field: `A` = data valid, `V` = void.
fn parse_status(field: &[u8]) -> Result<bool, ParseError> {
    match field {
        b"A" => Ok(true),
        b"V" => Ok(false),
        _ => Err(ParseError::Malformed),
    }
}

/// Parse the four coordinate fields (value, hemisphere, value, hemisphere).
///
/// All four empty means the receiver has no position yet; a partially
/// filled set is malformed.
fn parse_position(
    lat: &[u8],
    lat_hemisphere: &[u8],
    lon: &[u8],
    lon_hemisphere: &[u8],
) -> Result<Option<Coordinates>, ParseError> {
    if lat.is_empty() && lat_hemisphere.is_empty() && lon.is_empty() && lon_hemisphere.is_empty() {
        return Ok(None);
    }

    let latitude = parse_coordinate(lat, 2, 90.0).ok_or(ParseError::Malformed)?;
    let latitude = match lat_hemisphere {
        b"N" => latitude,
        b"S" => -latitude,
        _ => return Err(ParseError::Malformed),
    };

    let longitude = parse_coordinate(lon, 3, 180.0).ok_or(ParseError::Malformed)?;
    let longitude = match lon_hemisphere {
        b"E" => longitude,
        b"W" => -longitude,
        _ => return Err(ParseError::Malformed),
    };

    Ok(Some(Coordinates::new(latitude, longitude)))
}

/// Parse `ddmm.mmmm` (or `dddmm.mmmm`) into unsigned decimal degrees.
fn parse_coordinate(value: &[u8], max_degree_digits: usize, limit: f64) -> Option<f64> {
    let int_len = value
        .iter()
        .position(|&b| b == b'.')
        .unwrap_or(value.len());

    // Minutes always take the last two integer digits.
    if int_len < 3 || int_len > max_degree_digits + 2 {
        return None;
    }
    if !value[..int_len].iter().all(u8::is_ascii_digit) {
        return None;
    }

    let degrees = parse_uint(&value[..int_len - 2])? as f64;
    let minutes: f64 = parse_decimal(&value[int_len - 2..])?;
    if !(0.0..60.0).contains(&minutes) {
        return None;
    }

    let result = degrees + minutes / 60.0;
    if result > limit {
        return None;
    }
    Some(result)
}

/// Parse time from NMEA format (`hhmmss` with optional `.sss`).
fn parse_time(s: &[u8]) -> Option<UtcTime> {
    if s.len() < 6 {
        return None;
    }

    let hours = parse_2digits(&s[0..2])?;
    let minutes = parse_2digits(&s[2..4])?;
    let seconds = parse_2digits(&s[4..6])?;
    // 60 allows for a leap second.
    if hours > 23 || minutes > 59 || seconds > 60 {
        return None;
    }

    let milliseconds = match &s[6..] {
        [] => 0,
        [b'.', frac @ ..] => {
            if frac.is_empty() || !frac.iter().all(u8::is_ascii_digit) {
                return None;
            }
            let mut ms = 0u16;
            for i in 0..3 {
                let digit = frac.get(i).map_or(0, |d| (d - b'0') as u16);
                ms = ms * 10 + digit;
            }
            ms
        }
        _ => return None,
    };

    Some(UtcTime {
        hours,
        minutes,
        seconds,
        milliseconds,
    })
}

/// Parse date from NMEA format (`ddmmyy`).
fn parse_date(s: &[u8]) -> Option<Date> {
    if s.len() != 6 {
        return None;
    }

    let day = parse_2digits(&s[0..2])?;
    let month = parse_2digits(&s[2..4])?;
    let year = parse_2digits(&s[4..6])? as u16 + 2000;
    if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
        return None;
    }

    Some(Date { day, month, year })
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::format;
    use std::string::String;

    use super::*;

    /// Frame a body with `$`, its checksum, and CR LF.
    fn frame(body: &str) -> String {
        format!("${}*{:02X}\r\n", body, checksum(body.as_bytes()))
    }

    fn assert_close(actual: f64, expected: f64) {
        let diff = actual - expected;
        assert!(diff < 1e-9 && diff > -1e-9, "expected {expected}, got {actual}");
    }

    #[test]
    fn test_parse_gga() {
        let line = frame("GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,");
        let Ok(Sentence::Gga(gga)) = parse_sentence(line.as_bytes()) else {
            panic!("expected GGA");
        };

        let position = gga.position.unwrap();
        assert_close(position.latitude, 48.0 + 7.038 / 60.0);
        assert_close(position.longitude, 11.0 + 31.0 / 60.0);
        assert_eq!(gga.quality, FixQuality::GpsFix);
        assert_eq!(gga.satellites, Some(8));
        assert_eq!(gga.hdop, Some(0.9));
        assert_eq!(gga.altitude_m, Some(545.4));
        assert_eq!(
            gga.time,
            Some(UtcTime {
                hours: 12,
                minutes: 35,
                seconds: 19,
                milliseconds: 0
            })
        );
    }

    #[test]
    fn test_parse_gga_without_fix() {
        let line = frame("GPGGA,002153.000,,,,,0,00,,,M,,M,,");
        let Ok(Sentence::Gga(gga)) = parse_sentence(line.as_bytes()) else {
            panic!("expected GGA");
        };
        assert_eq!(gga.position, None);
        assert_eq!(gga.quality, FixQuality::Invalid);
        assert_eq!(gga.time.unwrap().hours, 0);
    }

    #[test]
    fn test_parse_rmc() {
        let line = frame("GPRMC,081836.75,A,3751.65,S,14507.36,E,000.0,360.0,130998,011.3,E");
        let Ok(Sentence::Rmc(rmc)) = parse_sentence(line.as_bytes()) else {
            panic!("expected RMC");
        };

        assert!(rmc.active);
        let position = rmc.position.unwrap();
        assert_close(position.latitude, -(37.0 + 51.65 / 60.0));
        assert_close(position.longitude, 145.0 + 7.36 / 60.0);
        assert_eq!(rmc.speed_knots, Some(0.0));
        assert_eq!(rmc.course_deg, Some(360.0));
        assert_eq!(
            rmc.date,
            Some(Date {
                day: 13,
                month: 9,
                year: 2098
            })
        );
        assert_eq!(rmc.time.unwrap().milliseconds, 750);
    }

    #[test]
    fn test_parse_rmc_void() {
        let line = frame("GNRMC,,V,,,,,,,,,,N");
        let Ok(Sentence::Rmc(rmc)) = parse_sentence(line.as_bytes()) else {
            panic!("expected RMC");
        };
        assert!(!rmc.active);
        assert_eq!(rmc.position, None);
    }

    #[test]
    fn test_parse_gll_west() {
        let line = frame("GPGLL,4916.45,N,12311.12,W,225444,A");
        let Ok(Sentence::Gll(gll)) = parse_sentence(line.as_bytes()) else {
            panic!("expected GLL");
        };
        assert!(gll.active);
        let position = gll.position.unwrap();
        assert_close(position.latitude, 49.0 + 16.45 / 60.0);
        assert_close(position.longitude, -(123.0 + 11.12 / 60.0));
    }

    #[test]
    fn test_any_talker_accepted() {
        for talker in ["GP", "GN", "GL", "GA", "BD"] {
            let line = frame(&format!("{talker}GLL,2348.61992,N,09024.75126,E,101500,A"));
            assert!(matches!(
                parse_sentence(line.as_bytes()),
                Ok(Sentence::Gll(_))
            ));
        }
    }

    #[test]
    fn test_lowercase_checksum_accepted() {
        let body = "GPGLL,4916.45,N,12311.12,W,225444,A";
        let line = format!("${}*{:02x}", body, checksum(body.as_bytes()));
        assert!(parse_sentence(line.as_bytes()).is_ok());
    }

    #[test]
    fn test_checksum_mismatch() {
        let body = "GPGLL,4916.45,N,12311.12,W,225444,A";
        let line = format!("${}*{:02X}\r\n", body, checksum(body.as_bytes()) ^ 0x01);
        assert_eq!(parse_sentence(line.as_bytes()), Err(ParseError::Checksum));
    }

    #[test]
    fn test_missing_checksum() {
        assert_eq!(
            parse_sentence(b"$GPGLL,4916.45,N,12311.12,W,225444,A\r\n"),
            Err(ParseError::Malformed)
        );
    }

    #[test]
    fn test_missing_dollar() {
        let line = frame("GPGLL,4916.45,N,12311.12,W,225444,A");
        assert_eq!(
            parse_sentence(&line.as_bytes()[1..]),
            Err(ParseError::Malformed)
        );
    }

    #[test]
    fn test_unsupported_types() {
        let gsv = frame("GPGSV,3,1,11,03,03,111,00,04,15,270,00,06,01,010,00,13,06,292,00");
        assert_eq!(parse_sentence(gsv.as_bytes()), Err(ParseError::Unsupported));

        let proprietary = frame("PUBX,00,081350.00,4717.113210,N");
        assert_eq!(
            parse_sentence(proprietary.as_bytes()),
            Err(ParseError::Unsupported)
        );
    }

    #[test]
    fn test_bad_hemisphere() {
        let line = frame("GPGLL,4916.45,X,12311.12,W,225444,A");
        assert_eq!(parse_sentence(line.as_bytes()), Err(ParseError::Malformed));
    }

    #[test]
    fn test_partial_position_rejected() {
        let line = frame("GPGLL,4916.45,N,,,225444,A");
        assert_eq!(parse_sentence(line.as_bytes()), Err(ParseError::Malformed));
    }

    #[test]
    fn test_minutes_out_of_range() {
        let line = frame("GPGLL,4966.45,N,12311.12,W,225444,A");
        assert_eq!(parse_sentence(line.as_bytes()), Err(ParseError::Malformed));
    }

    #[test]
    fn test_signed_minutes_rejected() {
        assert_eq!(parse_coordinate(b"123-0", 3, 180.0), None);
        assert_eq!(parse_coordinate(b"48-7.03", 2, 90.0), None);
        assert_eq!(parse_coordinate(b"-4807.038", 2, 90.0), None);

        let line = frame("GPGLL,4916.45,N,123-0,W,225444,A");
        assert_eq!(parse_sentence(line.as_bytes()), Err(ParseError::Malformed));
    }

    #[test]
    fn test_latitude_out_of_range() {
        let line = frame("GPGLL,9130.00,N,12311.12,W,225444,A");
        assert_eq!(parse_sentence(line.as_bytes()), Err(ParseError::Malformed));
    }

    #[test]
    fn test_truncated_gga_rejected() {
        let line = frame("GPGGA,123519,4807.038,N");
        assert_eq!(parse_sentence(line.as_bytes()), Err(ParseError::Malformed));
    }

    #[test]
    fn test_invalid_time_rejected() {
        let line = frame("GPGLL,4916.45,N,12311.12,W,256444,A");
        assert_eq!(parse_sentence(line.as_bytes()), Err(ParseError::Malformed));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_sentence(b""), Err(ParseError::Malformed));
        assert_eq!(parse_sentence(b"\r\n"), Err(ParseError::Malformed));
    }
}
