//! Network driver for [`FeedConsumer`].
//!
//! One tokio task per [`FeedHandle`] fetches the backfill, then holds a single
//! `/metrics` connection open, parses its body with `eventsource-stream`, and
//! flushes the consumer every [`FLUSH_INTERVAL`]. The consumer sits behind a
//! `Mutex` so the dashboard can read it from its own thread. Nothing is
//! retried: a failed backfill leaves the consumer empty and a dropped
//! connection leaves it disconnected.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use eventsource_stream::{Event, EventStreamError, Eventsource};
use futures_util::stream::{BoxStream, StreamExt};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use streamdash_core::{FLUSH_INTERVAL, FeedConsumer, TelemetrySample, TimeRange, now_ms};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

/// Server-sent events decoded from a `/metrics` body.
pub type LiveEvents = BoxStream<'static, Result<Event, EventStreamError<reqwest::Error>>>;

/// Parse a `/metrics` response body into server-sent events.
pub fn live_events(resp: reqwest::Response) -> LiveEvents {
    resp.bytes_stream().eventsource().boxed()
}

/// Hand one event to the consumer. A malformed payload is logged and dropped.
pub fn deliver(consumer: &mut FeedConsumer, event: &Event) {
    if let Err(e) = consumer.on_message(&event.data) {
        log::warn!("dropping live event: {e}");
    }
}

/// Lock the shared consumer. A panic while holding the lock cannot leave the
/// consumer half-updated, so a poisoned lock is still usable.
pub fn lock(consumer: &Mutex<FeedConsumer>) -> MutexGuard<'_, FeedConsumer> {
    consumer.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// FeedClient
// ---------------------------------------------------------------------------

/// HTTP access to a streamdash server.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    base_url: String,
}

impl FeedClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, FeedError> {
        let url = format!("{}{path}", self.base_url);
        let resp = self.http.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(FeedError::Status {
                url,
                status: resp.status(),
            });
        }
        Ok(resp)
    }

    /// `GET /historical`, oldest sample first.
    pub async fn fetch_historical(&self) -> Result<Vec<TelemetrySample>, FeedError> {
        let samples = self.get("/historical").await?.json().await?;
        Ok(samples)
    }

    /// Open `GET /metrics`. The body is an unbounded `text/event-stream`.
    pub async fn open_live(&self) -> Result<reqwest::Response, FeedError> {
        self.get("/metrics").await
    }
}

// ---------------------------------------------------------------------------
// FeedHandle
// ---------------------------------------------------------------------------

/// A running feed: backfill, one live connection, and the flush ticker.
pub struct FeedHandle {
    range: TimeRange,
    consumer: Arc<Mutex<FeedConsumer>>,
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl FeedHandle {
    /// Start the feed task. Must be called from inside a tokio runtime.
    pub fn spawn(client: FeedClient, range: TimeRange) -> Self {
        let consumer = Arc::new(Mutex::new(FeedConsumer::new(range)));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        log::debug!("starting feed from {} ({range})", client.base_url());
        let task = tokio::spawn(run_feed(client, Arc::clone(&consumer), shutdown_rx));
        Self {
            range,
            consumer,
            shutdown_tx,
            task: Some(task),
        }
    }

    pub fn time_range(&self) -> TimeRange {
        self.range
    }

    pub fn consumer(&self) -> Arc<Mutex<FeedConsumer>> {
        Arc::clone(&self.consumer)
    }

    /// Close the connection, stop the ticker and run the final flush. Calling
    /// it again does nothing.
    pub async fn shutdown(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = task.await {
            log::error!("feed task ended abnormally: {e}");
        }
        lock(&self.consumer).teardown(now_ms());
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        if self.task.is_some() {
            let _ = self.shutdown_tx.send(true);
        }
    }
}

async fn run_feed(
    client: FeedClient,
    consumer: Arc<Mutex<FeedConsumer>>,
    mut shutdown: watch::Receiver<bool>,
) {
    tokio::select! {
        _ = shutdown.changed() => {
            lock(&consumer).teardown(now_ms());
            return;
        }
        res = client.fetch_historical() => match res {
            Ok(samples) => lock(&consumer).seed(samples, now_ms()),
            Err(e) => log::warn!("historical backfill failed: {e}"),
        }
    }

    let mut events = tokio::select! {
        _ = shutdown.changed() => {
            lock(&consumer).teardown(now_ms());
            return;
        }
        res = client.open_live() => match res {
            Ok(resp) => {
                log::debug!("live feed connected");
                lock(&consumer).on_open();
                Some(live_events(resp))
            }
            Err(e) => {
                log::warn!("live feed connection failed: {e}");
                lock(&consumer).on_error();
                None
            }
        }
    };

    let mut ticker = tokio::time::interval(FLUSH_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {
                lock(&consumer).flush(now_ms());
            }
            event = next_event(&mut events) => match event {
                Some(Ok(ev)) => deliver(&mut lock(&consumer), &ev),
                Some(Err(EventStreamError::Transport(e))) => {
                    log::warn!("live feed error: {e}");
                    lock(&consumer).on_error();
                    events = None;
                }
                Some(Err(e)) => log::warn!("skipping unreadable live frame: {e}"),
                None => {
                    log::warn!("live feed closed by server");
                    lock(&consumer).on_error();
                    events = None;
                }
            }
        }
    }

    drop(events);
    lock(&consumer).teardown(now_ms());
    log::debug!("feed stopped");
}

/// Next live event, or never if there is no open connection.
async fn next_event(
    events: &mut Option<LiveEvents>,
) -> Option<Result<Event, EventStreamError<reqwest::Error>>> {
    match events {
        Some(stream) => stream.next().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::net::TcpListener;

    async fn spawn_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = streamdash_server::serve(listener).await;
        });
        format!("http://{addr}")
    }

    /// A base URL nothing is listening on.
    async fn dead_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    async fn wait_for(
        consumer: &Mutex<FeedConsumer>,
        cond: impl Fn(&FeedConsumer) -> bool,
    ) -> bool {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while tokio::time::Instant::now() < deadline {
            if cond(&*lock(consumer)) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        false
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let c = FeedClient::new("http://localhost:3000/");
        assert_eq!(c.base_url(), "http://localhost:3000");
    }

    async fn decode(chunks: Vec<Vec<u8>>) -> Vec<Event> {
        futures_util::stream::iter(chunks.into_iter().map(Ok::<_, std::convert::Infallible>))
            .eventsource()
            .filter_map(|r| futures_util::future::ready(r.ok()))
            .collect()
            .await
    }

    fn frame_for(ts: i64) -> Vec<u8> {
        let json = serde_json::to_string(&streamdash_core::generate_sample(ts)).unwrap();
        format!("data: {json}\n\n").into_bytes()
    }

    #[tokio::test]
    async fn frames_split_across_chunks_reach_consumer() {
        const NOW: i64 = 1_700_000_000_000;
        let mut body = Vec::new();
        for i in 0..10 {
            body.extend(frame_for(NOW + i * 100));
        }
        let chunks: Vec<Vec<u8>> = body.chunks(7).map(<[u8]>::to_vec).collect();

        let mut consumer = FeedConsumer::new(TimeRange::FiveMinutes);
        for ev in decode(chunks).await {
            deliver(&mut consumer, &ev);
        }
        assert_eq!(consumer.buffered(), 10);
        assert!(consumer.flush(NOW + 1000));
        assert_eq!(consumer.samples().len(), 10);
    }

    #[tokio::test]
    async fn line_endings_and_comments() {
        let body = b": keep-alive\r\ndata: a\r\n\r\ndata: b\r\rdata: c\n\n".to_vec();
        let data: Vec<String> = decode(vec![body]).await.into_iter().map(|e| e.data).collect();
        assert_eq!(data, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn malformed_frame_dropped_between_good_ones() {
        const NOW: i64 = 1_700_000_000_000;
        let mut body = frame_for(NOW);
        body.extend_from_slice(b"data: {\"bitrate\": oops}\n\n");
        body.extend(frame_for(NOW + 1000));

        let mut consumer = FeedConsumer::new(TimeRange::FiveMinutes);
        consumer.on_open();
        for ev in decode(vec![body]).await {
            deliver(&mut consumer, &ev);
        }
        assert_eq!(consumer.buffered(), 2);
        assert_eq!(consumer.dropped(), 1);
        assert!(consumer.is_connected());
    }

    #[tokio::test]
    async fn fetch_historical_from_server() {
        let client = FeedClient::new(spawn_server().await);
        let samples = client.fetch_historical().await.unwrap();
        assert_eq!(samples.len(), 721);
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let base = spawn_server().await;
        let client = FeedClient::new(format!("{base}/missing"));
        match client.fetch_historical().await {
            Err(FeedError::Status { status, .. }) => {
                assert_eq!(status, reqwest::StatusCode::NOT_FOUND)
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn feed_seeds_connects_and_flushes_live_samples() {
        let client = FeedClient::new(spawn_server().await);
        let mut feed = FeedHandle::spawn(client, TimeRange::TwentyFourHours);
        let consumer = feed.consumer();

        assert!(wait_for(&consumer, |c| c.is_connected() && c.samples().len() >= 721).await);
        let seeded = lock(&consumer).samples().len();
        assert_eq!(seeded, 721);

        // One live sample per second, flushed within half a second of arrival.
        assert!(wait_for(&consumer, |c| c.samples().len() > seeded).await);

        feed.shutdown().await;
        let c = lock(&consumer);
        assert!(c.is_closed());
        assert!(!c.is_connected());
        assert_eq!(c.buffered(), 0);
        assert_eq!(c.dropped(), 0);
    }

    #[tokio::test]
    async fn shutdown_twice_is_harmless() {
        let client = FeedClient::new(spawn_server().await);
        let mut feed = FeedHandle::spawn(client, TimeRange::FiveMinutes);
        let consumer = feed.consumer();
        assert!(wait_for(&consumer, |c| c.is_connected()).await);

        feed.shutdown().await;
        let updates = lock(&consumer).update_count();
        feed.shutdown().await;
        assert_eq!(lock(&consumer).update_count(), updates);
        assert!(lock(&consumer).is_closed());
    }

    #[tokio::test]
    async fn unreachable_server_leaves_empty_disconnected_state() {
        let client = FeedClient::new(dead_url().await);
        let mut feed = FeedHandle::spawn(client, TimeRange::OneHour);
        let consumer = feed.consumer();

        // Give both requests time to fail.
        tokio::time::sleep(Duration::from_millis(500)).await;
        {
            let c = lock(&consumer);
            assert!(c.samples().is_empty());
            assert!(!c.is_connected());
            assert!(!c.is_closed());
        }
        feed.shutdown().await;
        assert!(lock(&consumer).is_closed());
    }
}
