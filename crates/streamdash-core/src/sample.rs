//! The telemetry sample: one synthesized measurement record.
//!
//! Wire format is the JSON object the dashboard has always spoken:
//!
//! ```json
//! {"timestamp":1700000000000,"bitrate":3120,"latency":87,"errorRate":1.37,
//!  "activeStreams":121,"bandwidth":{"outgoing":934,"incoming":288}}
//! ```
//!
//! Every measurement except `activeStreams` is an arbitrary JSON number.

use serde::{Deserialize, Serialize};

/// Outgoing and incoming transfer volume, in megabytes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bandwidth {
    pub outgoing: f64,
    pub incoming: f64,
}

impl Bandwidth {
    /// Combined outgoing + incoming volume.
    pub fn total(&self) -> f64 {
        self.outgoing + self.incoming
    }
}

/// One synthetic streaming-media measurement.
///
/// Samples carry no identity beyond their timestamp and are never mutated
/// after they are produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySample {
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Kilobits per second.
    pub bitrate: f64,
    /// Milliseconds.
    pub latency: f64,
    /// Percentage of failed segments, 0.0..5.0.
    pub error_rate: f64,
    pub active_streams: u32,
    pub bandwidth: Bandwidth,
}

impl TelemetrySample {
    /// Age of this sample relative to `now_ms`. Negative if the sample is
    /// stamped in the future.
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms - self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TelemetrySample {
        TelemetrySample {
            timestamp: 1_700_000_000_000,
            bitrate: 3120.0,
            latency: 87.0,
            error_rate: 1.37,
            active_streams: 121,
            bandwidth: Bandwidth {
                outgoing: 934.0,
                incoming: 288.0,
            },
        }
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["errorRate"], 1.37);
        assert_eq!(json["activeStreams"], 121);
        assert_eq!(json["bandwidth"]["outgoing"], 934.0);
        assert!(json.get("error_rate").is_none());
    }

    #[test]
    fn parses_dashboard_payload() {
        let raw = r#"{"timestamp":1700000000000,"bitrate":3120,"latency":87,
            "errorRate":1.37,"activeStreams":121,
            "bandwidth":{"outgoing":934,"incoming":288}}"#;
        let parsed: TelemetrySample = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn fractional_measurements_accepted() {
        let raw = r#"{"timestamp":1700000000000,"bitrate":3120.5,"latency":87.25,
            "errorRate":1.37,"activeStreams":121,
            "bandwidth":{"outgoing":934.5,"incoming":288.75}}"#;
        let parsed: TelemetrySample = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.bitrate, 3120.5);
        assert_eq!(parsed.latency, 87.25);
        assert_eq!(parsed.bandwidth.total(), 1223.25);
    }

    #[test]
    fn fractional_stream_count_rejected() {
        let raw = r#"{"timestamp":1,"bitrate":3000,"latency":80,"errorRate":0.5,
            "activeStreams":120.5,"bandwidth":{"outgoing":900,"incoming":250}}"#;
        assert!(serde_json::from_str::<TelemetrySample>(raw).is_err());
    }

    #[test]
    fn missing_field_is_rejected() {
        let raw = r#"{"timestamp":1,"bitrate":3000}"#;
        assert!(serde_json::from_str::<TelemetrySample>(raw).is_err());
    }

    #[test]
    fn bandwidth_total_adds_both_directions() {
        assert_eq!(sample().bandwidth.total(), 1222.0);
    }

    #[test]
    fn age_is_relative_to_now() {
        let s = sample();
        assert_eq!(s.age_ms(s.timestamp + 500), 500);
        assert_eq!(s.age_ms(s.timestamp - 10), -10);
    }
}
