//! Retention windows selectable in the dashboard.

use std::str::FromStr;

/// Time span of samples kept visible. Drives both the historical-fetch
/// filter and live-buffer pruning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeRange {
    FiveMinutes,
    OneHour,
    #[default]
    TwelveHours,
    TwentyFourHours,
}

impl TimeRange {
    pub const ALL: [TimeRange; 4] = [
        Self::FiveMinutes,
        Self::OneHour,
        Self::TwelveHours,
        Self::TwentyFourHours,
    ];

    /// Retention window in milliseconds.
    pub fn retention_ms(self) -> i64 {
        match self {
            Self::FiveMinutes => 5 * 60 * 1000,
            Self::OneHour => 60 * 60 * 1000,
            Self::TwelveHours => 12 * 60 * 60 * 1000,
            Self::TwentyFourHours => 24 * 60 * 60 * 1000,
        }
    }

    /// True if a sample stamped `timestamp` is still inside the window at
    /// `now_ms`. The bound is inclusive.
    pub fn contains(self, timestamp: i64, now_ms: i64) -> bool {
        now_ms - timestamp <= self.retention_ms()
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::FiveMinutes => "5m",
            Self::OneHour => "1h",
            Self::TwelveHours => "12h",
            Self::TwentyFourHours => "24h",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::FiveMinutes => "Last 5 minutes",
            Self::OneHour => "Last 1 hour",
            Self::TwelveHours => "Last 12 hours",
            Self::TwentyFourHours => "Last 24 hours",
        }
    }

    /// Cycle to the next wider window, wrapping back to 5m.
    pub fn next(self) -> Self {
        match self {
            Self::FiveMinutes => Self::OneHour,
            Self::OneHour => Self::TwelveHours,
            Self::TwelveHours => Self::TwentyFourHours,
            Self::TwentyFourHours => Self::FiveMinutes,
        }
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Returned when a string is not one of `5m`, `1h`, `12h`, `24h`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTimeRangeError(String);

impl std::fmt::Display for ParseTimeRangeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown time range '{}' (expected one of 5m, 1h, 12h, 24h)",
            self.0
        )
    }
}

impl std::error::Error for ParseTimeRangeError {}

impl FromStr for TimeRange {
    type Err = ParseTimeRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.label() == s)
            .ok_or_else(|| ParseTimeRangeError(s.to_string()))
    }
}
