//! Network collaborator traits.
//!
//! The WiFi driver and HTTP stack live outside this crate. The tracker only
//! talks to them through these narrow seams, so any chip's networking stack
//! (or a host mock) can be plugged in.

use crate::config::Credentials;

/// Station-mode network link (WiFi association and status).
pub trait NetworkLink {
    /// Start joining the network with the given credentials.
    ///
    /// Returning `Ok` means the join was issued, not that the link is up.
    /// Poll [`is_connected`](Self::is_connected) for that.
    fn join(&mut self, credentials: &Credentials) -> Result<(), LinkError>;

    /// Whether the link is currently usable.
    fn is_connected(&mut self) -> bool;
}

/// Opens HTTP sessions against a URL.
///
/// A session borrows the connector, so at most one request is in flight
/// and the session is released when it goes out of scope.
pub trait HttpConnector {
    type Session<'a>: HttpSession
    where
        Self: 'a;

    fn open(&mut self, url: &str) -> Result<Self::Session<'_>, TransportError>;
}

/// One HTTP request/response exchange.
pub trait HttpSession {
    fn add_header(&mut self, name: &str, value: &str) -> Result<(), TransportError>;

    /// Send a POST with `body` and return the response status code.
    fn post(&mut self, body: &[u8]) -> Result<u16, TransportError>;

    /// Read response body bytes into `buf`. Returns 0 at end of body.
    fn read_body(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;
}

/// Monotonic millisecond clock.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Error type for [`NetworkLink`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// Driver or radio I/O failure.
    Io,
    /// A join is already in progress.
    Busy,
    /// Credentials rejected by the driver.
    InvalidCredentials,
}

impl core::fmt::Display for LinkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io => write!(f, "link I/O error"),
            Self::Busy => write!(f, "join already in progress"),
            Self::InvalidCredentials => write!(f, "invalid credentials"),
        }
    }
}

/// Error type for HTTP transport operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Could not connect to the server.
    Connect,
    /// No response within the stack's timeout.
    Timeout,
    /// Read or write failure mid-exchange.
    Io,
    /// URL rejected by the HTTP stack.
    InvalidUrl,
    /// Too many or too long headers.
    HeaderOverflow,
}

impl core::fmt::Display for TransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Connect => write!(f, "connection failed"),
            Self::Timeout => write!(f, "timed out"),
            Self::Io => write!(f, "I/O error"),
            Self::InvalidUrl => write!(f, "invalid URL"),
            Self::HeaderOverflow => write!(f, "header overflow"),
        }
    }
}
