//! Synthetic sample generation.
//!
//! Every field is an independent uniform draw; there is no continuity between
//! consecutive samples. Bitrate, latency and bandwidth are drawn as whole
//! numbers in their half-open range even though the wire type is a float.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

use crate::sample::{Bandwidth, TelemetrySample};

/// Number of minutes of backfill served by the historical endpoint.
pub const HISTORY_POINTS: usize = 720;

/// Spacing between historical points.
pub const HISTORY_STEP_MS: i64 = 60 * 1000;

pub const BITRATE_KBPS: std::ops::Range<u32> = 2500..4000;
pub const LATENCY_MS: std::ops::Range<u32> = 50..200;
pub const ERROR_RATE_PCT: std::ops::Range<f64> = 0.0..5.0;
pub const ACTIVE_STREAMS: std::ops::Range<u32> = 100..150;
pub const OUTGOING_MB: std::ops::Range<u32> = 800..1200;
pub const INCOMING_MB: std::ops::Range<u32> = 200..350;

/// Wall-clock milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Draw one sample stamped `timestamp` from the supplied RNG.
pub fn generate_sample_with<R: Rng + ?Sized>(rng: &mut R, timestamp: i64) -> TelemetrySample {
    TelemetrySample {
        timestamp,
        bitrate: f64::from(rng.random_range(BITRATE_KBPS)),
        latency: f64::from(rng.random_range(LATENCY_MS)),
        error_rate: rng.random_range(ERROR_RATE_PCT),
        active_streams: rng.random_range(ACTIVE_STREAMS),
        bandwidth: Bandwidth {
            outgoing: f64::from(rng.random_range(OUTGOING_MB)),
            incoming: f64::from(rng.random_range(INCOMING_MB)),
        },
    }
}

/// Draw one sample stamped `timestamp` from the thread-local RNG.
pub fn generate_sample(timestamp: i64) -> TelemetrySample {
    generate_sample_with(&mut rand::rng(), timestamp)
}

/// Backfill window ending at `now`: `HISTORY_POINTS + 1` samples, oldest
/// first, `HISTORY_STEP_MS` apart. The last sample is stamped exactly `now`.
pub fn historical_window(now: i64) -> Vec<TelemetrySample> {
    let mut rng = rand::rng();
    (0..=HISTORY_POINTS as i64)
        .rev()
        .map(|i| generate_sample_with(&mut rng, now - i * HISTORY_STEP_MS))
        .collect()
}
