//! Sentence payload types: coordinates, time, and the supported sentences.

/// A geographic position in signed decimal degrees.
///
/// Positive latitude is North, positive longitude is East.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// UTC time of day as reported by the receiver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UtcTime {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub milliseconds: u16,
}

/// UTC calendar date (RMC only).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Date {
    pub day: u8,
    pub month: u8,
    pub year: u16,
}

/// GGA fix quality indicator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FixQuality {
    #[default]
    Invalid = 0,
    GpsFix = 1,
    DgpsFix = 2,
    PpsFix = 3,
    RtkFixed = 4,
    RtkFloat = 5,
    Estimated = 6,
    Manual = 7,
    Simulation = 8,
}

impl From<u8> for FixQuality {
    fn from(value: u8) -> Self {
        match value {
            1 => FixQuality::GpsFix,
            2 => FixQuality::DgpsFix,
            3 => FixQuality::PpsFix,
            4 => FixQuality::RtkFixed,
            5 => FixQuality::RtkFloat,
            6 => FixQuality::Estimated,
            7 => FixQuality::Manual,
            8 => FixQuality::Simulation,
            _ => FixQuality::Invalid,
        }
    }
}

/// GGA: Global Positioning System fix data.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Gga {
    pub time: Option<UtcTime>,
    pub position: Option<Coordinates>,
    pub quality: FixQuality,
    pub satellites: Option<u8>,
    /// Horizontal dilution of precision
    pub hdop: Option<f32>,
    /// Altitude above mean sea level in meters
    pub altitude_m: Option<f32>,
}

/// RMC: Recommended minimum navigation information.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rmc {
    pub time: Option<UtcTime>,
    /// Status field: `A` (active) or `V` (void)
    pub active: bool,
    pub position: Option<Coordinates>,
    pub speed_knots: Option<f32>,
    pub course_deg: Option<f32>,
    pub date: Option<Date>,
}

/// GLL: Geographic position, latitude/longitude.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Gll {
    pub position: Option<Coordinates>,
    pub time: Option<UtcTime>,
    pub active: bool,
}

/// A parsed, checksum-verified sentence.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[must_use]
pub enum Sentence {
    Gga(Gga),
    Rmc(Rmc),
    Gll(Gll),
}

impl Sentence {
    /// Position carried by the sentence, if its coordinate fields were filled.
    #[inline]
    pub fn position(&self) -> Option<Coordinates> {
        match self {
            Sentence::Gga(gga) => gga.position,
            Sentence::Rmc(rmc) => rmc.position,
            Sentence::Gll(gll) => gll.position,
        }
    }

    /// Whether the receiver reported a usable fix in this sentence.
    #[inline]
    #[must_use]
    pub fn has_fix(&self) -> bool {
        match self {
            Sentence::Gga(gga) => gga.quality != FixQuality::Invalid,
            Sentence::Rmc(rmc) => rmc.active,
            Sentence::Gll(gll) => gll.active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_quality_from_u8() {
        assert_eq!(FixQuality::from(0), FixQuality::Invalid);
        assert_eq!(FixQuality::from(1), FixQuality::GpsFix);
        assert_eq!(FixQuality::from(8), FixQuality::Simulation);
        assert_eq!(FixQuality::from(42), FixQuality::Invalid);
    }

    #[test]
    fn test_sentence_has_fix() {
        let gga = Sentence::Gga(Gga {
            quality: FixQuality::DgpsFix,
            ..Gga::default()
        });
        assert!(gga.has_fix());

        let rmc = Sentence::Rmc(Rmc::default());
        assert!(!rmc.has_fix());
        assert_eq!(rmc.position(), None);
    }
}
