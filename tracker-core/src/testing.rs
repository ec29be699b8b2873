//! Hand-written collaborators for unit tests.

extern crate std;

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::string::{String, ToString};
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_io::{ErrorKind, ErrorType, Read, ReadReady};
use nmea_proto::{write_sentence, MAX_FRAME_SIZE};

use crate::config::Credentials;
use crate::transport::{Clock, HttpConnector, HttpSession, LinkError, NetworkLink, TransportError};

/// Frame `body` as a checksummed sentence.
pub fn sentence(body: &str) -> Vec<u8> {
    let mut buf = [0u8; MAX_FRAME_SIZE];
    let len = write_sentence(body, &mut buf).unwrap();
    Vec::from(&buf[..len])
}

pub fn assert_close(actual: f64, expected: f64, eps: f64) {
    let diff = if actual > expected {
        actual - expected
    } else {
        expected - actual
    };
    assert!(diff < eps, "{} != {} (eps {})", actual, expected, eps);
}

/// One recorded POST.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Scripted WiFi link and recording HTTP stack.
pub struct MockNetwork {
    pub connected: bool,
    /// After a join, the link comes up on this connectivity poll (1-based).
    pub connects_on_poll: Option<u32>,
    /// The link comes up once this many joins have been issued.
    pub connects_on_join: Option<u32>,
    /// Results for the next joins, in order; `join_result` once exhausted.
    pub join_script: VecDeque<Result<(), LinkError>>,
    pub join_result: Result<(), LinkError>,
    pub open_result: Result<(), TransportError>,
    pub post_result: Result<u16, TransportError>,
    pub response: Vec<u8>,
    /// Fail body reads once this many bytes have been returned.
    pub read_error_after: Option<usize>,
    pub joins: u32,
    pub polls: u32,
    pub posts: Vec<Post>,
    joined: bool,
    polls_since_join: u32,
}

impl MockNetwork {
    pub fn connected() -> Self {
        Self {
            connected: true,
            connects_on_poll: None,
            connects_on_join: None,
            join_script: VecDeque::new(),
            join_result: Ok(()),
            open_result: Ok(()),
            post_result: Ok(200),
            response: Vec::new(),
            read_error_after: None,
            joins: 0,
            polls: 0,
            posts: Vec::new(),
            joined: false,
            polls_since_join: 0,
        }
    }

    pub fn disconnected(connects_on_poll: Option<u32>) -> Self {
        Self {
            connected: false,
            connects_on_poll,
            ..Self::connected()
        }
    }
}

impl NetworkLink for MockNetwork {
    fn join(&mut self, _credentials: &Credentials) -> Result<(), LinkError> {
        self.joins += 1;
        let result = self.join_script.pop_front().unwrap_or(self.join_result);
        self.joined = result.is_ok();
        self.polls_since_join = 0;
        result
    }

    fn is_connected(&mut self) -> bool {
        self.polls += 1;
        if !self.connected && self.joined {
            self.polls_since_join += 1;
            let by_poll = self
                .connects_on_poll
                .is_some_and(|n| self.polls_since_join >= n);
            let by_join = self.connects_on_join.is_some_and(|n| self.joins >= n);
            if by_poll || by_join {
                self.connected = true;
            }
        }
        self.connected
    }
}

pub struct MockSession<'a> {
    network: &'a mut MockNetwork,
    url: String,
    headers: Vec<(String, String)>,
    read_pos: usize,
}

impl HttpConnector for MockNetwork {
    type Session<'a>
        = MockSession<'a>
    where
        Self: 'a;

    fn open(&mut self, url: &str) -> Result<Self::Session<'_>, TransportError> {
        self.open_result?;
        Ok(MockSession {
            network: self,
            url: url.to_string(),
            headers: Vec::new(),
            read_pos: 0,
        })
    }
}

impl HttpSession for MockSession<'_> {
    fn add_header(&mut self, name: &str, value: &str) -> Result<(), TransportError> {
        self.headers.push((name.to_string(), value.to_string()));
        Ok(())
    }

    fn post(&mut self, body: &[u8]) -> Result<u16, TransportError> {
        self.network.posts.push(Post {
            url: self.url.clone(),
            headers: self.headers.clone(),
            body: Vec::from(body),
        });
        self.network.post_result
    }

    fn read_body(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        if self
            .network
            .read_error_after
            .is_some_and(|n| self.read_pos >= n)
        {
            return Err(TransportError::Io);
        }
        // Small chunks to exercise the caller's read loop.
        let remaining = &self.network.response[self.read_pos..];
        let n = remaining.len().min(buf.len()).min(16);
        buf[..n].copy_from_slice(&remaining[..n]);
        self.read_pos += n;
        Ok(n)
    }
}

/// Delay that returns immediately and records what was asked for.
#[derive(Default)]
pub struct RecordingDelay {
    pub waits_ms: Vec<u32>,
}

impl RecordingDelay {
    pub fn total_ms(&self) -> u64 {
        self.waits_ms.iter().map(|&ms| u64::from(ms)).sum()
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.delay_ms(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.waits_ms.push(ms);
    }
}

/// Shared millisecond clock moved by hand.
#[derive(Clone, Default)]
pub struct ManualClock(Rc<Cell<u64>>);

impl ManualClock {
    pub fn advance(&self, ms: u64) {
        self.0.set(self.0.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.0.get()
    }
}

/// Serial port backed by a byte queue.
#[derive(Default)]
pub struct MockSerial {
    pub rx: VecDeque<u8>,
    /// Fail the next read with this error.
    pub fail_next: Option<ErrorKind>,
}

impl MockSerial {
    pub fn push(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }
}

impl ErrorType for MockSerial {
    type Error = ErrorKind;
}

impl ReadReady for MockSerial {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(self.fail_next.is_some() || !self.rx.is_empty())
    }
}

impl Read for MockSerial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if let Some(kind) = self.fail_next.take() {
            return Err(kind);
        }
        let mut n = 0;
        while n < buf.len() {
            match self.rx.pop_front() {
                Some(b) => {
                    buf[n] = b;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }
}
