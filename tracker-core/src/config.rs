//! Tracker configuration.
//!
//! Built once at startup and passed by value into the pipeline. Nothing in
//! the crate mutates it afterwards.

use heapless::String;

/// Interval between fix evaluations.
pub const DEFAULT_SEND_INTERVAL_SECS: u32 = 5;
/// Connectivity polls after a reconnect before giving up on a delivery.
pub const DEFAULT_RECONNECT_MAX_ATTEMPTS: u8 = 10;
/// Wait between connectivity polls.
pub const DEFAULT_RECONNECT_DELAY_SECS: u32 = 1;

/// Maximum SSID length (IEEE 802.11).
pub const SSID_CAPACITY: usize = 32;
/// Maximum WPA2 passphrase length.
pub const PASSWORD_CAPACITY: usize = 64;
pub const ENDPOINT_CAPACITY: usize = 128;

/// WiFi station credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    ssid: String<SSID_CAPACITY>,
    password: String<PASSWORD_CAPACITY>,
}

impl Credentials {
    /// Create credentials, checking them against the driver limits.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptySsid`], [`ConfigError::SsidTooLong`] or
    /// [`ConfigError::PasswordTooLong`].
    pub fn new(ssid: &str, password: &str) -> Result<Self, ConfigError> {
        if ssid.is_empty() {
            return Err(ConfigError::EmptySsid);
        }
        let mut s = String::new();
        s.push_str(ssid).map_err(|()| ConfigError::SsidTooLong)?;
        let mut p = String::new();
        p.push_str(password)
            .map_err(|()| ConfigError::PasswordTooLong)?;
        Ok(Self {
            ssid: s,
            password: p,
        })
    }

    #[inline]
    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    #[inline]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("ssid", &self.ssid)
            .field("password", &"***")
            .finish()
    }
}

/// Which HTTP responses count as a successful delivery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusPolicy {
    /// Any received status code is success.
    #[default]
    AnyResponse,
    /// Only 200..=299 is success.
    Only2xx,
}

impl StatusPolicy {
    #[inline]
    #[must_use]
    pub fn accepts(self, status: u16) -> bool {
        match self {
            Self::AnyResponse => true,
            Self::Only2xx => (200..300).contains(&status),
        }
    }
}

/// Immutable tracker configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    credentials: Credentials,
    endpoint: String<ENDPOINT_CAPACITY>,
    send_interval_secs: u32,
    reconnect_max_attempts: u8,
    reconnect_delay_secs: u32,
    status_policy: StatusPolicy,
}

impl TrackerConfig {
    /// Create a configuration with default timing.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the credentials exceed driver limits or
    /// the endpoint is not an `http://` or `https://` URL that fits.
    ///
    /// # Example
    ///
    /// ```
    /// use tracker_core::{StatusPolicy, TrackerConfig};
    ///
    /// let config = TrackerConfig::new("tracker-ap", "secret", "http://10.0.0.2:8000/api/location/")
    ///     .unwrap()
    ///     .with_send_interval_secs(10)
    ///     .with_status_policy(StatusPolicy::Only2xx);
    /// assert_eq!(config.send_interval_ms(), 10_000);
    /// assert_eq!(config.reconnect_max_attempts(), 10);
    /// ```
    pub fn new(ssid: &str, password: &str, endpoint: &str) -> Result<Self, ConfigError> {
        let credentials = Credentials::new(ssid, password)?;

        let scheme_ok = endpoint
            .strip_prefix("http://")
            .or_else(|| endpoint.strip_prefix("https://"))
            .is_some_and(|rest| !rest.is_empty());
        if !scheme_ok {
            return Err(ConfigError::InvalidEndpoint);
        }
        let mut url = String::new();
        url.push_str(endpoint)
            .map_err(|()| ConfigError::EndpointTooLong)?;

        Ok(Self {
            credentials,
            endpoint: url,
            send_interval_secs: DEFAULT_SEND_INTERVAL_SECS,
            reconnect_max_attempts: DEFAULT_RECONNECT_MAX_ATTEMPTS,
            reconnect_delay_secs: DEFAULT_RECONNECT_DELAY_SECS,
            status_policy: StatusPolicy::default(),
        })
    }

    /// Set the evaluation interval. Zero is clamped to one second.
    #[must_use]
    pub fn with_send_interval_secs(mut self, secs: u32) -> Self {
        self.send_interval_secs = secs.max(1);
        self
    }

    #[must_use]
    pub fn with_reconnect_max_attempts(mut self, attempts: u8) -> Self {
        self.reconnect_max_attempts = attempts;
        self
    }

    #[must_use]
    pub fn with_reconnect_delay_secs(mut self, secs: u32) -> Self {
        self.reconnect_delay_secs = secs;
        self
    }

    #[must_use]
    pub fn with_status_policy(mut self, policy: StatusPolicy) -> Self {
        self.status_policy = policy;
        self
    }

    #[inline]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    #[inline]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[inline]
    pub fn send_interval_secs(&self) -> u32 {
        self.send_interval_secs
    }

    #[inline]
    pub fn reconnect_max_attempts(&self) -> u8 {
        self.reconnect_max_attempts
    }

    #[inline]
    pub fn reconnect_delay_secs(&self) -> u32 {
        self.reconnect_delay_secs
    }

    #[inline]
    pub fn status_policy(&self) -> StatusPolicy {
        self.status_policy
    }

    #[inline]
    pub fn send_interval_ms(&self) -> u64 {
        u64::from(self.send_interval_secs) * 1000
    }

    /// Reconnect delay in milliseconds, saturating at `u32::MAX`.
    #[inline]
    pub fn reconnect_delay_ms(&self) -> u32 {
        self.reconnect_delay_secs.saturating_mul(1000)
    }
}

/// Error type for configuration validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    EmptySsid,
    SsidTooLong,
    PasswordTooLong,
    EndpointTooLong,
    /// Endpoint is not an `http://` or `https://` URL.
    InvalidEndpoint,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::EmptySsid => write!(f, "SSID is empty"),
            Self::SsidTooLong => write!(f, "SSID longer than {} bytes", SSID_CAPACITY),
            Self::PasswordTooLong => {
                write!(f, "password longer than {} bytes", PASSWORD_CAPACITY)
            }
            Self::EndpointTooLong => {
                write!(f, "endpoint longer than {} bytes", ENDPOINT_CAPACITY)
            }
            Self::InvalidEndpoint => write!(f, "endpoint must be an http:// or https:// URL"),
        }
    }
}
