//! Client-side feed consumer.
//!
//! Bridges the one-sample-per-second push channel to renderable state:
//!
//! 1. `seed` replaces visible state with the historical backfill, filtered to
//!    the selected [`TimeRange`].
//! 2. Live messages land in a scratch buffer.
//! 3. Every [`FLUSH_INTERVAL`] the driver calls `flush`, which moves the whole
//!    buffer into visible state in one update and prunes by retention window.
//! 4. `teardown` performs one last flush and closes the consumer.
//!
//! The consumer never reads the clock itself; callers pass `now_ms`. That
//! keeps pruning deterministic under test.

use std::time::Duration;

use thiserror::Error;

use crate::range::TimeRange;
use crate::sample::TelemetrySample;

/// Render cadence. Caps state updates at 2 Hz regardless of feed rate.
pub const FLUSH_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum ConsumerError {
    #[error("malformed sample payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("consumer already torn down")]
    Closed,
}

#[derive(Debug)]
pub struct FeedConsumer {
    range: TimeRange,
    samples: Vec<TelemetrySample>,
    buffer: Vec<TelemetrySample>,
    connected: bool,
    closed: bool,
    updates: u64,
    dropped: u64,
}

impl FeedConsumer {
    pub fn new(range: TimeRange) -> Self {
        Self {
            range,
            samples: Vec::new(),
            buffer: Vec::new(),
            connected: false,
            closed: false,
            updates: 0,
            dropped: 0,
        }
    }

    pub fn time_range(&self) -> TimeRange {
        self.range
    }

    /// Replace visible state with the part of `historical` that falls inside
    /// the retention window.
    pub fn seed(&mut self, historical: Vec<TelemetrySample>, now_ms: i64) {
        let range = self.range;
        self.samples = historical
            .into_iter()
            .filter(|s| range.contains(s.timestamp, now_ms))
            .collect();
        self.updates += 1;
    }

    /// The live connection reported open.
    pub fn on_open(&mut self) {
        if !self.closed {
            self.connected = true;
        }
    }

    /// The live connection failed. No reconnect is attempted.
    pub fn on_error(&mut self) {
        self.connected = false;
    }

    /// Decode one event payload into the scratch buffer. A malformed payload
    /// is counted and dropped; the connection is unaffected.
    pub fn on_message(&mut self, data: &str) -> Result<(), ConsumerError> {
        if self.closed {
            return Err(ConsumerError::Closed);
        }
        match serde_json::from_str::<TelemetrySample>(data) {
            Ok(sample) => {
                self.buffer.push(sample);
                Ok(())
            }
            Err(e) => {
                self.dropped += 1;
                Err(e.into())
            }
        }
    }

    /// Buffer an already-decoded sample.
    pub fn push(&mut self, sample: TelemetrySample) {
        if !self.closed {
            self.buffer.push(sample);
        }
    }

    /// Move every buffered sample into visible state and prune to the
    /// retention window. Returns false (and touches nothing) when the buffer
    /// is empty.
    pub fn flush(&mut self, now_ms: i64) -> bool {
        if self.buffer.is_empty() {
            return false;
        }
        self.samples.append(&mut self.buffer);
        let range = self.range;
        self.samples.retain(|s| range.contains(s.timestamp, now_ms));
        self.updates += 1;
        true
    }

    /// Final flush, then close. Safe to call more than once.
    pub fn teardown(&mut self, now_ms: i64) {
        if self.closed {
            return;
        }
        self.connected = false;
        self.flush(now_ms);
        self.closed = true;
    }

    pub fn samples(&self) -> &[TelemetrySample] {
        &self.samples
    }

    pub fn latest(&self) -> Option<&TelemetrySample> {
        self.samples.last()
    }

    pub fn previous(&self) -> Option<&TelemetrySample> {
        self.samples.len().checked_sub(2).map(|i| &self.samples[i])
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Samples received but not yet flushed.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Number of visible-state replacements (seed or non-empty flush).
    pub fn update_count(&self) -> u64 {
        self.updates
    }

    /// Malformed payloads discarded so far.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
