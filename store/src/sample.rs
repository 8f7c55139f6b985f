use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};

/// One measurement as reported by the source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// When the source took the measurement, not when we received it.
    pub record_timestamp: DateTime<Utc>,
    pub tps: f64,
    pub mspt: f64,
}

/// TPS aggregated over one bucket width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub start: DateTime<Utc>,
    pub average: f64,
    pub min: f64,
    pub max: f64,
}
