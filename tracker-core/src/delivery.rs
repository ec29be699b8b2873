//! DeliveryPipeline: ships one eligible fix to the HTTP endpoint.
//!
//! Delivery is an explicit state machine so the reconnect wait is visible to
//! the caller instead of hidden in a busy loop:
//!
//! ```text
//! Idle ──begin()──► Idle(payload) ──connected──► Sending ──► Done
//!                        │                          ▲
//!                   disconnected                    │
//!                        ▼                          │
//!               Reconnecting { attempt } ──up───────┘
//!                        │
//!                   cap reached ──► Done (ReconnectExhausted)
//! ```
//!
//! [`DeliveryPipeline::step`] never sleeps. It returns [`Step::Wait`] and the
//! driver decides how to wait; [`DeliveryPipeline::deliver`] is the blocking
//! driver built on an injected [`DelayNs`].

use embedded_hal::delay::DelayNs;
use heapless::String;
use log::{debug, info, warn};

use crate::config::TrackerConfig;
use crate::fix::PositionFix;
use crate::payload::{build_payload, Payload, PayloadError, CONTENT_TYPE};
use crate::transport::{HttpConnector, HttpSession, NetworkLink, TransportError};

/// Response bytes kept for logging; longer bodies are truncated.
pub const RESPONSE_BODY_CAPACITY: usize = 256;

pub type ResponseBody = String<RESPONSE_BODY_CAPACITY>;

/// Outcome of one delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryAttempt {
    pub success: bool,
    /// Status code, present whenever the server answered.
    pub status_code: Option<u16>,
    pub response_body: Option<ResponseBody>,
    pub error: Option<DeliveryError>,
}

impl DeliveryAttempt {
    #[must_use]
    pub fn succeeded(status: u16, body: Option<ResponseBody>) -> Self {
        Self {
            success: true,
            status_code: Some(status),
            response_body: body,
            error: None,
        }
    }

    #[must_use]
    pub fn rejected(status: u16, body: Option<ResponseBody>) -> Self {
        Self {
            success: false,
            status_code: Some(status),
            response_body: body,
            error: Some(DeliveryError::Rejected),
        }
    }

    /// Failure before any response was received.
    #[must_use]
    pub fn failed(error: DeliveryError) -> Self {
        Self {
            success: false,
            status_code: None,
            response_body: None,
            error: Some(error),
        }
    }
}

/// Error type for delivery operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeliveryError {
    /// `step` was called with no delivery in progress.
    NotStarted,
    /// A delivery is already in progress.
    Busy,
    /// The fix could not be encoded.
    Encoding(PayloadError),
    /// The link did not come back within the reconnect cap.
    ReconnectExhausted,
    /// The HTTP exchange failed.
    Transport(TransportError),
    /// The server answered with a status the policy does not accept.
    Rejected,
}

impl From<TransportError> for DeliveryError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

impl From<PayloadError> for DeliveryError {
    fn from(e: PayloadError) -> Self {
        Self::Encoding(e)
    }
}

impl core::fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotStarted => write!(f, "no delivery in progress"),
            Self::Busy => write!(f, "delivery already in progress"),
            Self::Encoding(e) => write!(f, "encoding failed: {}", e),
            Self::ReconnectExhausted => write!(f, "failed to reconnect"),
            Self::Transport(e) => write!(f, "transport error: {}", e),
            Self::Rejected => write!(f, "rejected by server"),
        }
    }
}

/// Delivery state.
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryState {
    /// Nothing in flight, or a payload is staged and connectivity is unchecked.
    Idle,
    /// Waiting for the link; `attempt` polls done so far.
    Reconnecting { attempt: u8 },
    /// Link is up; the next step posts.
    Sending,
    Done(DeliveryAttempt),
}

/// Result of one [`DeliveryPipeline::step`].
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Call `step` again right away.
    Continue,
    /// Wait this many milliseconds, then call `step` again.
    Wait(u32),
    Finished(DeliveryAttempt),
    /// No delivery in progress.
    Idle,
}

/// Connectivity-gated, single-shot HTTP delivery.
pub struct DeliveryPipeline {
    config: TrackerConfig,
    state: DeliveryState,
    payload: Option<Payload>,
}

impl DeliveryPipeline {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            state: DeliveryState::Idle,
            payload: None,
        }
    }

    #[inline]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    #[inline]
    pub fn state(&self) -> &DeliveryState {
        &self.state
    }

    /// Stage `fix` for delivery.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Busy`] if a delivery is in progress, or
    /// [`DeliveryError::Encoding`] if the fix cannot be serialized.
    pub fn begin(&mut self, fix: &PositionFix) -> Result<(), DeliveryError> {
        let in_flight = match self.state {
            DeliveryState::Idle => self.payload.is_some(),
            DeliveryState::Done(_) => false,
            DeliveryState::Reconnecting { .. } | DeliveryState::Sending => true,
        };
        if in_flight {
            return Err(DeliveryError::Busy);
        }

        let payload = build_payload(fix)?;
        info!("Sending JSON: {}", payload.as_str());
        self.payload = Some(payload);
        self.state = DeliveryState::Idle;
        Ok(())
    }

    /// Advance the delivery by one transition. Never sleeps.
    pub fn step<N: NetworkLink + HttpConnector>(&mut self, network: &mut N) -> Step {
        let state = core::mem::replace(&mut self.state, DeliveryState::Idle);
        let (next, step) = match state {
            DeliveryState::Idle if self.payload.is_none() => (DeliveryState::Idle, Step::Idle),
            DeliveryState::Idle => {
                if network.is_connected() {
                    (DeliveryState::Sending, Step::Continue)
                } else {
                    warn!("WiFi disconnected! Reconnecting...");
                    if let Err(e) = network.join(self.config.credentials()) {
                        warn!("WiFi join failed: {}", e);
                    }
                    self.wait_or_give_up(0)
                }
            }
            DeliveryState::Reconnecting { attempt } => {
                let attempt = attempt.saturating_add(1);
                if network.is_connected() {
                    info!("Reconnected to WiFi after {} polls", attempt);
                    (DeliveryState::Sending, Step::Continue)
                } else {
                    debug!("WiFi still down (poll {})", attempt);
                    self.wait_or_give_up(attempt)
                }
            }
            DeliveryState::Sending => match self.payload.take() {
                Some(payload) => {
                    let attempt = self.send(network, &payload);
                    (
                        DeliveryState::Done(attempt.clone()),
                        Step::Finished(attempt),
                    )
                }
                None => (DeliveryState::Idle, Step::Idle),
            },
            DeliveryState::Done(attempt) => {
                let step = Step::Finished(attempt.clone());
                (DeliveryState::Done(attempt), step)
            }
        };
        self.state = next;
        step
    }

    /// Deliver `fix`, sleeping on `delay` while waiting for the link.
    ///
    /// Makes at most one POST. The pipeline is idle again on return.
    pub fn deliver<N, D>(
        &mut self,
        fix: &PositionFix,
        network: &mut N,
        delay: &mut D,
    ) -> DeliveryAttempt
    where
        N: NetworkLink + HttpConnector,
        D: DelayNs,
    {
        if let Err(e) = self.begin(fix) {
            warn!("Delivery not started: {}", e);
            return DeliveryAttempt::failed(e);
        }
        loop {
            match self.step(network) {
                Step::Continue => {}
                Step::Wait(ms) => delay.delay_ms(ms),
                Step::Finished(attempt) => {
                    self.state = DeliveryState::Idle;
                    return attempt;
                }
                Step::Idle => return DeliveryAttempt::failed(DeliveryError::NotStarted),
            }
        }
    }

    /// Next state after an unsuccessful connectivity poll.
    fn wait_or_give_up(&mut self, attempt: u8) -> (DeliveryState, Step) {
        if attempt >= self.config.reconnect_max_attempts() {
            warn!("Failed to reconnect");
            self.payload = None;
            let outcome = DeliveryAttempt::failed(DeliveryError::ReconnectExhausted);
            (
                DeliveryState::Done(outcome.clone()),
                Step::Finished(outcome),
            )
        } else {
            (
                DeliveryState::Reconnecting { attempt },
                Step::Wait(self.config.reconnect_delay_ms()),
            )
        }
    }

    fn send<C: HttpConnector>(&self, connector: &mut C, payload: &Payload) -> DeliveryAttempt {
        match self.exchange(connector, payload) {
            Ok((status, body)) => {
                info!("HTTP Response code: {}", status);
                if let Some(body) = &body {
                    info!("Server Response: {}", body.as_str());
                }
                if self.config.status_policy().accepts(status) {
                    DeliveryAttempt::succeeded(status, body)
                } else {
                    warn!("Server rejected data with status {}", status);
                    DeliveryAttempt::rejected(status, body)
                }
            }
            Err(e) => {
                warn!("Error sending data: {}", e);
                DeliveryAttempt::failed(e.into())
            }
        }
    }

    /// One POST on a fresh session. The session is released on return.
    fn exchange<C: HttpConnector>(
        &self,
        connector: &mut C,
        payload: &Payload,
    ) -> Result<(u16, Option<ResponseBody>), TransportError> {
        let mut session = connector.open(self.config.endpoint())?;
        session.add_header("Content-Type", CONTENT_TYPE)?;
        let status = session.post(payload.as_bytes())?;

        let body = match read_response(&mut session) {
            Ok(body) => Some(body),
            Err(e) => {
                warn!("Failed to read server response: {}", e);
                None
            }
        };
        Ok((status, body))
    }
}

/// Read up to [`RESPONSE_BODY_CAPACITY`] bytes of the response body.
///
/// The result is cut at the last complete UTF-8 character. A read error
/// after some bytes arrived ends the body early; an error on the first read
/// is returned.
fn read_response<S: HttpSession>(session: &mut S) -> Result<ResponseBody, TransportError> {
    let mut buf = [0u8; RESPONSE_BODY_CAPACITY];
    let mut filled = 0;
    while filled < buf.len() {
        let n = match session.read_body(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if filled == 0 => return Err(e),
            Err(e) => {
                warn!("Server response cut short after {} bytes: {}", filled, e);
                break;
            }
        };
        filled = (filled + n).min(buf.len());
    }

    let bytes = &buf[..filled];
    let text = match core::str::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => core::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or_default(),
    };
    let mut body = ResponseBody::new();
    // Cannot fail: `text` is at most RESPONSE_BODY_CAPACITY bytes.
    let _ = body.push_str(text);
    Ok(body)
}
