//! Platform-agnostic GPS telemetry core.
//!
//! Reads NMEA fixes from a serial byte stream and periodically POSTs the
//! latest position as JSON over a WiFi link:
//!
//! - [`FixAccumulator`] - Turns raw serial bytes into [`PositionFix`] snapshots
//! - [`DeliveryPipeline`] - Reconnect-gated, single-shot HTTP delivery
//! - [`Tracker`] - Driving loop tying the two together on a send interval
//! - [`TrackerConfig`] - Immutable configuration built once at startup
//!
//! Hardware is reached only through traits: `embedded_io::{Read, ReadReady}`
//! for the GPS UART, [`NetworkLink`] and [`HttpConnector`] for networking,
//! [`Clock`] for time and `embedded_hal::delay::DelayNs` for sleeping.
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod accumulator;
pub mod config;
pub mod delivery;
pub mod fix;
pub mod payload;
pub mod tracker;
pub mod transport;

#[cfg(test)]
mod testing;

pub use accumulator::{AccumulatorStats, FixAccumulator};
pub use config::{ConfigError, Credentials, StatusPolicy, TrackerConfig};
pub use delivery::{DeliveryAttempt, DeliveryError, DeliveryPipeline, DeliveryState, Step};
pub use fix::{PositionFix, SkipReason};
pub use payload::{build_payload, Payload, PayloadError, CONTENT_TYPE};
pub use tracker::{PollOutcome, Tracker};
pub use transport::{Clock, HttpConnector, HttpSession, LinkError, NetworkLink, TransportError};
