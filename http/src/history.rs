use crate::{
    error::AppError,
    router::AppState,
};
use axum::{
    extract::{
        rejection::QueryRejection,
        Query,
        State,
    },
    Json,
};
use chrono::Utc;
use serde::{
    Deserialize,
    Serialize,
};
use tps_history_store::{
    Bucket,
    Period,
};

const BUCKET_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    period: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    /// Bucket start, UTC.
    pub timestamp: String,
    pub tps: TpsStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TpsStats {
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

impl From<Bucket> for HistoryPoint {
    fn from(bucket: Bucket) -> Self {
        Self {
            timestamp: bucket.start.format(BUCKET_FORMAT).to_string(),
            tps: TpsStats {
                average: bucket.average,
                min: bucket.min,
                max: bucket.max,
            },
        }
    }
}

/// `GET /api/tps/history?period=24h|7d|30d`
///
/// A missing, unknown or unparseable period falls back to `24h` instead of
/// being rejected.
pub async fn handler(
    State(state): State<AppState>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<Vec<HistoryPoint>>, AppError> {
    let token = query.ok().and_then(|Query(query)| query.period);
    let period = Period::from_token(token.as_deref());

    let buckets = state.store.buckets(period, Utc::now()).await?;
    debug!(%period, buckets = buckets.len(), store = state.store.name(), "tps history served");

    Ok(Json(buckets.into_iter().map(HistoryPoint::from).collect()))
}
