use chrono::Duration;
use std::fmt;
use tracing::debug;

/// Days of history requested for every scan.
pub const LOOKBACK_DAYS: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Timeframe {
    M1,
    M2,
    #[default]
    M5,
    M15,
    H1,
}

impl Timeframe {
    /// Maps a caller label to a timeframe. Unknown labels fall back to 5m.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "1m" => Self::M1,
            "2m" => Self::M2,
            "5m" => Self::M5,
            "15m" => Self::M15,
            "1h" => Self::H1,
            other => {
                debug!("Unknown timeframe '{}', using 5m", other);
                Self::default()
            }
        }
    }

    /// Interval code understood by the chart endpoint.
    pub fn interval_code(self) -> &'static str {
        match self {
            Self::M1 => "1m",
            Self::M2 => "2m",
            Self::M5 => "5m",
            Self::M15 => "15m",
            Self::H1 => "60m",
        }
    }

    pub fn lookback() -> Duration {
        Duration::days(LOOKBACK_DAYS)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.interval_code())
    }
}
