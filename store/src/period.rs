use chrono::{
    DateTime,
    TimeDelta,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};
use strum::{
    Display,
    EnumIter,
    EnumString,
};

/// Query periods accepted by the history endpoint.
#[derive(Debug, Default, Clone, Copy, Display, EnumIter, EnumString, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Period {
    #[default]
    #[strum(serialize = "24h")]
    #[serde(rename = "24h")]
    Day,
    #[strum(serialize = "7d")]
    #[serde(rename = "7d")]
    Week,
    #[strum(serialize = "30d")]
    #[serde(rename = "30d")]
    Month,
}

struct Window {
    lookback: TimeDelta,
    bucket_width: TimeDelta,
}

impl Period {
    fn window(self) -> Window {
        match self {
            Period::Day => Window {
                lookback: TimeDelta::hours(24),
                bucket_width: TimeDelta::minutes(1),
            },
            Period::Week => Window {
                lookback: TimeDelta::days(7),
                bucket_width: TimeDelta::hours(1),
            },
            Period::Month => Window {
                lookback: TimeDelta::days(30),
                bucket_width: TimeDelta::hours(1),
            },
        }
    }

    /// Resolve a user supplied token. Anything unknown, including no token at
    /// all, resolves to the default period.
    pub fn from_token(token: Option<&str>) -> Self {
        token.and_then(|token| token.parse().ok()).unwrap_or_default()
    }

    pub fn lookback(self) -> TimeDelta {
        self.window().lookback
    }

    pub fn bucket_width(self) -> TimeDelta {
        self.window().bucket_width
    }

    /// Oldest timestamp still inside the window ending at `now`.
    pub fn since(self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.lookback()
    }

    /// Start of the bucket `ts` falls into. Buckets are aligned to the unix epoch.
    pub fn bucket_start(self, ts: DateTime<Utc>) -> DateTime<Utc> {
        let width = self.bucket_width().num_milliseconds();
        ts - TimeDelta::milliseconds(ts.timestamp_millis().rem_euclid(width))
    }
}
