//! JSON wire payload for a position fix.
//!
//! ```text
//! {"lat": 23.810332, "lng": 90.412521}
//! ```
//!
//! Coordinates are written with exactly six decimal places.

use core::fmt::Write;

use heapless::String;

use crate::fix::PositionFix;

/// Worst case: `{"lat": -90.000000, "lng": -180.000000}` is 39 bytes.
pub const PAYLOAD_CAPACITY: usize = 64;

pub type Payload = String<PAYLOAD_CAPACITY>;

/// Content type sent with every payload.
pub const CONTENT_TYPE: &str = "application/json";

/// Error type for payload encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PayloadError {
    /// A coordinate is NaN or infinite.
    NonFinite,
    /// The encoded payload does not fit [`PAYLOAD_CAPACITY`].
    Overflow,
}

impl core::fmt::Display for PayloadError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NonFinite => write!(f, "non-finite coordinate"),
            Self::Overflow => write!(f, "payload overflow"),
        }
    }
}

/// Encode `fix` as the JSON payload.
///
/// # Errors
///
/// Returns [`PayloadError::NonFinite`] for NaN or infinite coordinates.
pub fn build_payload(fix: &PositionFix) -> Result<Payload, PayloadError> {
    if !fix.latitude.is_finite() || !fix.longitude.is_finite() {
        return Err(PayloadError::NonFinite);
    }
    let mut out = Payload::new();
    write!(
        out,
        "{{\"lat\": {:.6}, \"lng\": {:.6}}}",
        fix.latitude, fix.longitude
    )
    .map_err(|_| PayloadError::Overflow)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_exact_bytes() {
        let payload = build_payload(&PositionFix::new(23.810332, 90.412521, true)).unwrap();
        assert_eq!(payload.as_str(), r#"{"lat": 23.810332, "lng": 90.412521}"#);
    }

    #[test]
    fn test_payload_rounds_to_six_places() {
        let payload = build_payload(&PositionFix::new(48.1173, -11.516666666, true)).unwrap();
        assert_eq!(payload.as_str(), r#"{"lat": 48.117300, "lng": -11.516667}"#);
    }

    #[test]
    fn test_payload_extremes_fit() {
        let payload = build_payload(&PositionFix::new(-90.0, -180.0, true)).unwrap();
        assert_eq!(payload.as_str(), r#"{"lat": -90.000000, "lng": -180.000000}"#);
    }

    #[test]
    fn test_payload_rejects_non_finite() {
        assert_eq!(
            build_payload(&PositionFix::new(f64::NAN, 1.0, true)),
            Err(PayloadError::NonFinite)
        );
        assert_eq!(
            build_payload(&PositionFix::new(1.0, f64::INFINITY, true)),
            Err(PayloadError::NonFinite)
        );
    }
}
