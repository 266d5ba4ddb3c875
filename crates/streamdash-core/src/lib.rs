//! # streamdash-core
//!
//! **Live streaming-media telemetry, end to end.**
//!
//! `streamdash-core` holds everything about the metrics pipeline that does not
//! touch a socket: the sample model, the synthetic generator, retention
//! windows, the buffered feed consumer, and the dashboard summaries.
//!
//! ## Quick Start
//!
//! ```
//! use streamdash_core::{FeedConsumer, TimeRange, generate_sample, historical_window, now_ms};
//!
//! let now = now_ms();
//! let mut consumer = FeedConsumer::new(TimeRange::OneHour);
//! consumer.seed(historical_window(now), now);
//! assert_eq!(consumer.samples().len(), 61);
//!
//! consumer.push(generate_sample(now + 1000));
//! assert!(consumer.flush(now + 1000));
//! ```
//!
//! ## Architecture
//!
//! Generator → `/historical` (seed) + `/metrics` (1 Hz SSE) → Consumer buffer →
//! 500 ms flush → visible state → dashboard
//!
//! The server crate exposes the two endpoints; the CLI drives a
//! [`FeedConsumer`] over HTTP and renders it.

pub mod consumer;
pub mod export;
pub mod generator;
pub mod range;
pub mod sample;
pub mod summary;

pub use consumer::{ConsumerError, FLUSH_INTERVAL, FeedConsumer};
pub use export::{export_filename, write_export};
pub use generator::{
    HISTORY_POINTS, HISTORY_STEP_MS, generate_sample, generate_sample_with, historical_window,
    now_ms,
};
pub use range::{ParseTimeRangeError, TimeRange};
pub use sample::{Bandwidth, TelemetrySample};
pub use summary::{HealthStatus, Kpis, Metric, SeriesSummary, Trend, ViewMode};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
