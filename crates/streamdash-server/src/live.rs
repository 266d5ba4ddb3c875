//! Per-connection live feed.
//!
//! Each `GET /metrics` request gets its own [`LiveFeed`], which owns the tick
//! timer and the timestamp of the last sample it sent. When the client goes
//! away axum drops the response body, the feed is dropped with it, and the
//! timer goes with it. Nothing is buffered for a disconnected client.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::response::sse::Event;
use futures_util::stream::Stream;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use streamdash_core::{TelemetrySample, generate_sample, now_ms};

/// One sample per second.
pub const LIVE_INTERVAL: Duration = Duration::from_millis(1000);

/// Lifecycle of a feed. `Closed` is not represented: a closed feed has been
/// dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    /// Constructed, not yet polled by the response body.
    Idle,
    /// Polled at least once; ticking.
    Streaming,
}

pub struct LiveFeed {
    interval: Interval,
    last_timestamp: i64,
    state: FeedState,
    emitted: u64,
}

impl LiveFeed {
    /// First sample is due one `period` after construction.
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            interval,
            last_timestamp: i64::MIN,
            state: FeedState::Idle,
            emitted: 0,
        }
    }

    pub fn state(&self) -> FeedState {
        self.state
    }

    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Generate the next sample. Timestamps never go backwards within one
    /// feed, even if the wall clock does.
    fn next_sample(&mut self) -> TelemetrySample {
        let ts = now_ms().max(self.last_timestamp);
        self.last_timestamp = ts;
        self.emitted += 1;
        generate_sample(ts)
    }
}

impl Stream for LiveFeed {
    type Item = Result<Event, axum::Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.state == FeedState::Idle {
            self.state = FeedState::Streaming;
            log::debug!("live feed streaming");
        }
        match self.interval.poll_tick(cx) {
            Poll::Ready(_) => {
                let sample = self.next_sample();
                Poll::Ready(Some(Event::default().json_data(&sample)))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for LiveFeed {
    fn drop(&mut self) {
        log::debug!("live feed closed after {} samples", self.emitted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    #[tokio::test(start_paused = true)]
    async fn first_sample_after_one_period() {
        let mut feed = LiveFeed::new(LIVE_INTERVAL);
        assert_eq!(feed.state(), FeedState::Idle);

        let started = Instant::now();
        let ev = feed.next().await;
        assert!(matches!(ev, Some(Ok(_))));
        assert_eq!(feed.state(), FeedState::Streaming);
        assert!(started.elapsed() >= LIVE_INTERVAL);
        assert_eq!(feed.emitted(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period() {
        let mut feed = LiveFeed::new(LIVE_INTERVAL);
        let started = Instant::now();
        for _ in 0..5 {
            feed.next().await;
        }
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(5));
        assert!(elapsed < Duration::from_secs(6));
        assert_eq!(feed.emitted(), 5);
    }

    #[tokio::test]
    async fn timestamps_never_decrease() {
        let mut feed = LiveFeed::new(LIVE_INTERVAL);
        feed.last_timestamp = now_ms() + 60_000;
        let ahead = feed.last_timestamp;
        let s = feed.next_sample();
        assert_eq!(s.timestamp, ahead);
        let t = feed.next_sample();
        assert!(t.timestamp >= s.timestamp);
    }
}
