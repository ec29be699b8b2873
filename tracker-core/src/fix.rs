//! Position fix snapshot and the delivery eligibility rule.

use nmea_proto::Coordinates;

/// Latest known position as assembled from the GPS stream.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PositionFix {
    /// Degrees, positive North
    pub latitude: f64,
    /// Degrees, positive East
    pub longitude: f64,
    /// Receiver-reported fix validity
    pub valid: bool,
}

impl PositionFix {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64, valid: bool) -> Self {
        Self {
            latitude,
            longitude,
            valid,
        }
    }

    /// Build a fix from decoded coordinates.
    #[must_use]
    pub const fn from_coordinates(coordinates: Coordinates, valid: bool) -> Self {
        Self::new(coordinates.latitude, coordinates.longitude, valid)
    }

    /// Both coordinates are exactly zero: an uninitialized reading.
    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }

    /// Check whether this fix may be delivered.
    ///
    /// A fix is eligible only when the receiver reported it valid and it is
    /// not the all-zero sentinel.
    #[inline]
    pub fn check(&self) -> Result<(), SkipReason> {
        if !self.valid {
            Err(SkipReason::Invalid)
        } else if self.is_zero() {
            Err(SkipReason::Sentinel)
        } else {
            Ok(())
        }
    }

    #[inline]
    #[must_use]
    pub fn is_eligible(&self) -> bool {
        self.check().is_ok()
    }
}

/// Why a fix was not handed to delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SkipReason {
    /// Receiver reported no fix.
    Invalid,
    /// Coordinates are exactly `0.0, 0.0`.
    Sentinel,
}
