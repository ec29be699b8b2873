//! Tracker: connects the GPS serial source to the delivery pipeline.

use embedded_hal::delay::DelayNs;
use embedded_io::{Error as _, Read, ReadReady};
use log::{info, warn};

use crate::accumulator::FixAccumulator;
use crate::config::TrackerConfig;
use crate::delivery::{DeliveryAttempt, DeliveryPipeline};
use crate::fix::SkipReason;
use crate::transport::{Clock, HttpConnector, NetworkLink};

/// Bytes pulled from the serial source per read.
const READ_CHUNK: usize = 64;

/// Sleep between loop iterations in [`Tracker::run`].
pub const IDLE_POLL_MS: u32 = 10;

/// What a call to [`Tracker::poll_once`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The send interval has not elapsed yet.
    NotDue,
    /// No position sentence has been received yet.
    NoFix,
    /// A fix exists but is not eligible for delivery.
    Skipped(SkipReason),
    Delivered(DeliveryAttempt),
}

/// Periodic GPS-to-HTTP forwarder.
///
/// Owns the serial source and network stack for its lifetime. Every call
/// to [`poll_once`](Self::poll_once) drains the bytes that are already
/// buffered, then evaluates the latest fix once per send interval.
pub struct Tracker<S, N, K, D> {
    source: S,
    network: N,
    clock: K,
    delay: D,
    accumulator: FixAccumulator,
    pipeline: DeliveryPipeline,
    last_evaluation_ms: Option<u64>,
}

impl<S, N, K, D> Tracker<S, N, K, D>
where
    S: Read + ReadReady,
    N: NetworkLink + HttpConnector,
    K: Clock,
    D: DelayNs,
{
    pub fn new(config: TrackerConfig, source: S, network: N, clock: K, delay: D) -> Self {
        Self {
            source,
            network,
            clock,
            delay,
            accumulator: FixAccumulator::new(),
            pipeline: DeliveryPipeline::new(config),
            last_evaluation_ms: None,
        }
    }

    /// Join the network and block until the link is up.
    ///
    /// The join is re-issued after a join error, and after every
    /// `reconnect_max_attempts` unsuccessful polls.
    pub fn bring_up(&mut self) {
        let config = self.pipeline.config();
        let polls_per_join = config.reconnect_max_attempts().max(1);
        info!("Connecting to WiFi {}...", config.credentials().ssid());
        loop {
            match self.network.join(config.credentials()) {
                Ok(()) => {
                    for _ in 0..polls_per_join {
                        if self.network.is_connected() {
                            info!("WiFi connected!");
                            return;
                        }
                        self.delay.delay_ms(config.reconnect_delay_ms());
                    }
                    warn!("WiFi still down, joining again");
                }
                Err(e) => {
                    warn!("WiFi join failed: {}", e);
                    self.delay.delay_ms(config.reconnect_delay_ms());
                }
            }
        }
    }

    /// Run the tracker loop indefinitely.
    pub fn run(&mut self) -> ! {
        loop {
            let _ = self.poll_once();
            self.delay.delay_ms(IDLE_POLL_MS);
        }
    }

    /// Drain buffered serial bytes, then evaluate the fix if due.
    pub fn poll_once(&mut self) -> PollOutcome {
        self.drain();

        let now = self.clock.now_ms();
        if let Some(last) = self.last_evaluation_ms {
            if now.saturating_sub(last) < self.pipeline.config().send_interval_ms() {
                return PollOutcome::NotDue;
            }
        }
        self.last_evaluation_ms = Some(now);

        let Some(fix) = self.accumulator.current_fix() else {
            info!("GPS data not available yet. Waiting for valid data...");
            return PollOutcome::NoFix;
        };
        match fix.check() {
            Ok(()) => {}
            Err(SkipReason::Invalid) => {
                info!("GPS data not available yet. Waiting for valid data...");
                return PollOutcome::Skipped(SkipReason::Invalid);
            }
            Err(SkipReason::Sentinel) => {
                info!("Invalid GPS location data. Skipping this update.");
                return PollOutcome::Skipped(SkipReason::Sentinel);
            }
        }

        let attempt = self
            .pipeline
            .deliver(&fix, &mut self.network, &mut self.delay);
        PollOutcome::Delivered(attempt)
    }

    /// Feed every byte the source has ready. Returns the number of bytes read.
    ///
    /// Never blocks. A read error ends the drain; the next call retries.
    pub fn drain(&mut self) -> usize {
        let mut buf = [0u8; READ_CHUNK];
        let mut total = 0;
        loop {
            match self.source.read_ready() {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    warn!("GPS serial error: {:?}", e.kind());
                    break;
                }
            }
            match self.source.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    self.accumulator.feed_slice(&buf[..n]);
                    total += n;
                }
                Err(e) => {
                    warn!("GPS serial error: {:?}", e.kind());
                    break;
                }
            }
        }
        total
    }

    pub fn accumulator(&self) -> &FixAccumulator {
        &self.accumulator
    }

    pub fn pipeline(&self) -> &DeliveryPipeline {
        &self.pipeline
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut N {
        &mut self.network
    }

    /// Decompose the tracker into its collaborators.
    pub fn into_parts(self) -> (S, N, K, D) {
        (self.source, self.network, self.clock, self.delay)
    }
}
