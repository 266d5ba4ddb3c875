//! Read-only summaries the dashboard derives from consumer state: KPI tiles,
//! chart descriptions, axis bounds, and session health.

use crate::sample::TelemetrySample;

// ---------------------------------------------------------------------------
// Metric
// ---------------------------------------------------------------------------

/// A plottable series extracted from samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Bitrate,
    Latency,
    ErrorRate,
    ActiveStreams,
    BandwidthOutgoing,
    BandwidthIncoming,
}

impl Metric {
    pub fn value_from(self, s: &TelemetrySample) -> f64 {
        match self {
            Self::Bitrate => s.bitrate,
            Self::Latency => s.latency,
            Self::ErrorRate => s.error_rate,
            Self::ActiveStreams => f64::from(s.active_streams),
            Self::BandwidthOutgoing => s.bandwidth.outgoing,
            Self::BandwidthIncoming => s.bandwidth.incoming,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Bitrate => "Bitrate",
            Self::Latency => "Latency",
            Self::ErrorRate => "Error Rate",
            Self::ActiveStreams => "Active Streams",
            Self::BandwidthOutgoing => "Outgoing",
            Self::BandwidthIncoming => "Incoming",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Self::Bitrate => "kbps",
            Self::Latency => "ms",
            Self::ErrorRate => "%",
            Self::ActiveStreams => "",
            Self::BandwidthOutgoing | Self::BandwidthIncoming => "MB",
        }
    }

    /// `(timestamp, value)` pairs ready for a chart dataset.
    pub fn series(self, samples: &[TelemetrySample]) -> Vec<(f64, f64)> {
        samples
            .iter()
            .map(|s| (s.timestamp as f64, self.value_from(s)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Series summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesSummary {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

impl SeriesSummary {
    /// `None` when there are no samples.
    pub fn of(metric: Metric, samples: &[TelemetrySample]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let mut min = f64::MAX;
        let mut max = f64::MIN;
        let mut sum = 0.0;
        for s in samples {
            let v = metric.value_from(s);
            min = min.min(v);
            max = max.max(v);
            sum += v;
        }
        Some(Self {
            min,
            max,
            avg: sum / samples.len() as f64,
        })
    }

    /// Accessible one-line description of a chart.
    pub fn describe(&self, title: &str) -> String {
        format!(
            "Chart showing {title} over time. Minimum: {:.2}, Maximum: {:.2}, Average: {:.2}",
            self.min, self.max, self.avg
        )
    }
}

/// Upper bound for a `[0, bound]` y axis: `max` rounded up to 1, 2, 2.5 or
/// 5 times a power of ten.
pub fn axis_upper_bound(max: f64) -> f64 {
    if !max.is_finite() || max <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powi(max.log10().floor() as i32);
    let fraction = max / magnitude;
    let nice = if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 2.5 {
        2.5
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

// ---------------------------------------------------------------------------
// KPIs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    pub fn arrow(self) -> &'static str {
        match self {
            Self::Up => "▲",
            Self::Down => "▼",
        }
    }
}

/// Values shown in the KPI tiles.
#[derive(Debug, Clone, PartialEq)]
pub struct Kpis {
    pub latest: TelemetrySample,
    /// Percent change vs. the previous sample, one decimal place.
    pub bitrate_change: f64,
    pub latency_change: f64,
    /// Rising bitrate is good.
    pub bitrate_trend: Trend,
    /// Falling latency is good, so it reports `Up`.
    pub latency_trend: Trend,
}

/// Error rate above which the KPI tile is highlighted.
pub const ERROR_RATE_ALERT_PCT: f64 = 2.0;

impl Kpis {
    pub fn from_samples(samples: &[TelemetrySample]) -> Option<Self> {
        let latest = samples.last()?.clone();
        let previous = samples.len().checked_sub(2).map(|i| &samples[i]);

        let (bitrate_change, latency_change) = match previous {
            Some(prev) => (
                percent_change(prev.bitrate, latest.bitrate),
                percent_change(prev.latency, latest.latency),
            ),
            None => (0.0, 0.0),
        };

        Some(Self {
            bitrate_trend: if bitrate_change > 0.0 {
                Trend::Up
            } else {
                Trend::Down
            },
            latency_trend: if latency_change < 0.0 {
                Trend::Up
            } else {
                Trend::Down
            },
            latest,
            bitrate_change,
            latency_change,
        })
    }

    pub fn error_rate_alert(&self) -> bool {
        self.latest.error_rate > ERROR_RATE_ALERT_PCT
    }
}

fn percent_change(prev: f64, cur: f64) -> f64 {
    if prev == 0.0 {
        return 0.0;
    }
    ((cur - prev) / prev * 1000.0).round() / 10.0
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

impl HealthStatus {
    pub fn from_error_rate(error_rate: f64) -> Self {
        if error_rate < 1.0 {
            Self::Healthy
        } else if error_rate < 3.0 {
            Self::Warning
        } else {
            Self::Critical
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Healthy => "Healthy",
            Self::Warning => "Warning",
            Self::Critical => "Critical",
        }
    }
}

pub fn connection_label(connected: bool) -> &'static str {
    if connected { "Live" } else { "Disconnected" }
}

/// Dashboard layout toggle. Affects layout only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Overview,
    Detailed,
}

impl ViewMode {
    pub fn toggle(self) -> Self {
        match self {
            Self::Overview => Self::Detailed,
            Self::Detailed => Self::Overview,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Detailed => "Detailed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::Bandwidth;

    fn sample(ts: i64, bitrate: u32, latency: u32, error_rate: f64) -> TelemetrySample {
        TelemetrySample {
            timestamp: ts,
            bitrate: f64::from(bitrate),
            latency: f64::from(latency),
            error_rate,
            active_streams: 120,
            bandwidth: Bandwidth {
                outgoing: 900.0,
                incoming: 250.0,
            },
        }
    }

    #[test]
    fn series_summary_min_max_avg() {
        let data = vec![
            sample(1, 3000, 100, 1.0),
            sample(2, 2600, 60, 2.0),
            sample(3, 3400, 140, 3.0),
        ];
        let s = SeriesSummary::of(Metric::Bitrate, &data).unwrap();
        assert_eq!(s.min, 2600.0);
        assert_eq!(s.max, 3400.0);
        assert!((s.avg - 3000.0).abs() < 1e-9);
        assert_eq!(
            s.describe("Bitrate"),
            "Chart showing Bitrate over time. Minimum: 2600.00, Maximum: 3400.00, Average: 3000.00"
        );
    }

    #[test]
    fn series_summary_empty_is_none() {
        assert!(SeriesSummary::of(Metric::Latency, &[]).is_none());
    }

    #[test]
    fn metric_extracts_fields() {
        let s = sample(9, 3100, 75, 0.5);
        assert_eq!(Metric::Bitrate.value_from(&s), 3100.0);
        assert_eq!(Metric::Latency.value_from(&s), 75.0);
        assert_eq!(Metric::ErrorRate.value_from(&s), 0.5);
        assert_eq!(Metric::ActiveStreams.value_from(&s), 120.0);
        assert_eq!(Metric::BandwidthOutgoing.value_from(&s), 900.0);
        assert_eq!(Metric::BandwidthIncoming.value_from(&s), 250.0);
        assert_eq!(Metric::Latency.series(&[s]), vec![(9.0, 75.0)]);
    }

    #[test]
    fn axis_bound_rounds_up() {
        assert_eq!(axis_upper_bound(3999.0), 5000.0);
        assert_eq!(axis_upper_bound(199.0), 200.0);
        assert_eq!(axis_upper_bound(4.9), 5.0);
        assert_eq!(axis_upper_bound(1150.0), 2000.0);
        assert_eq!(axis_upper_bound(240.0), 250.0);
        assert_eq!(axis_upper_bound(0.0), 1.0);
        assert_eq!(axis_upper_bound(f64::NAN), 1.0);
    }

    #[test]
    fn kpis_single_sample_has_zero_change() {
        let k = Kpis::from_samples(&[sample(1, 3000, 100, 1.0)]).unwrap();
        assert_eq!(k.bitrate_change, 0.0);
        assert_eq!(k.latency_change, 0.0);
        assert_eq!(k.bitrate_trend, Trend::Down);
        assert_eq!(k.latency_trend, Trend::Down);
    }

    #[test]
    fn kpis_percent_change_and_trends() {
        let k = Kpis::from_samples(&[sample(1, 3000, 100, 1.0), sample(2, 3300, 80, 2.5)])
            .unwrap();
        assert_eq!(k.bitrate_change, 10.0);
        assert_eq!(k.latency_change, -20.0);
        assert_eq!(k.bitrate_trend, Trend::Up);
        assert_eq!(k.latency_trend, Trend::Up);
        assert!(k.error_rate_alert());
        assert_eq!(k.latest.timestamp, 2);
    }

    #[test]
    fn kpis_change_rounded_to_one_decimal() {
        let k = Kpis::from_samples(&[sample(1, 3000, 150, 0.1), sample(2, 3001, 151, 0.1)])
            .unwrap();
        assert_eq!(k.bitrate_change, 0.0);
        assert_eq!(k.latency_change, 0.7);
        assert_eq!(k.latency_trend, Trend::Down);
        assert!(!k.error_rate_alert());
    }

    #[test]
    fn kpis_empty_is_none() {
        assert!(Kpis::from_samples(&[]).is_none());
    }

    #[test]
    fn health_thresholds() {
        assert_eq!(HealthStatus::from_error_rate(0.0), HealthStatus::Healthy);
        assert_eq!(HealthStatus::from_error_rate(0.99), HealthStatus::Healthy);
        assert_eq!(HealthStatus::from_error_rate(1.0), HealthStatus::Warning);
        assert_eq!(HealthStatus::from_error_rate(2.99), HealthStatus::Warning);
        assert_eq!(HealthStatus::from_error_rate(3.0), HealthStatus::Critical);
    }

    #[test]
    fn connection_labels() {
        assert_eq!(connection_label(true), "Live");
        assert_eq!(connection_label(false), "Disconnected");
    }

    #[test]
    fn view_mode_toggles() {
        assert_eq!(ViewMode::default(), ViewMode::Overview);
        assert_eq!(ViewMode::Overview.toggle(), ViewMode::Detailed);
        assert_eq!(ViewMode::Detailed.toggle(), ViewMode::Overview);
    }
}
