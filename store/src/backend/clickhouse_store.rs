use crate::{
    Bucket,
    HistoryStore,
    Period,
    Sample,
    StoreError,
    StoreFuture,
};
use chrono::{
    DateTime,
    Utc,
};
use clickhouse::Client;

const TABLE: &str = "tps_history";

// Buckets are epoch-aligned millisecond ranges so one query serves every
// period; width and window start are bound, never formatted in.
const BUCKETS_QUERY: &str = "
    SELECT
        toInt64(intDiv(toUnixTimestamp64Milli(record_timestamp), ?) * ?) AS bucket,
        avg(tps) AS avg_tps,
        min(tps) AS min_tps,
        max(tps) AS max_tps
    FROM tps_history
    WHERE record_timestamp >= fromUnixTimestamp64Milli(toInt64(?), 'UTC')
    GROUP BY bucket
    ORDER BY bucket ASC
";

/// [`HistoryStore`] backed by the ClickHouse `tps_history` table.
///
/// The client is cheap to clone and pools its HTTP connections internally, so
/// one instance is created at startup and shared by every workflow.
#[derive(Clone)]
pub struct ClickHouseStore {
    client: Client,
}

impl ClickHouseStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl HistoryStore for ClickHouseStore {
    fn insert(&self, sample: Sample) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let row = SampleRow::from(sample);
            let mut insert = self.client.insert(TABLE)?;
            insert.write(&row).await?;
            insert.end().await?;
            Ok(())
        })
    }

    fn buckets(&self, period: Period, now: DateTime<Utc>) -> StoreFuture<'_, Vec<Bucket>> {
        Box::pin(async move {
            let width_ms = period.bucket_width().num_milliseconds();
            let since_ms = period.since(now).timestamp_millis();
            debug!(%period, width_ms, since_ms, "querying tps buckets");

            let rows: Vec<BucketRow> = self
                .client
                .query(BUCKETS_QUERY)
                .bind(width_ms)
                .bind(width_ms)
                .bind(since_ms)
                .fetch_all()
                .await?;

            rows.into_iter().map(Bucket::try_from).collect()
        })
    }

    fn name(&self) -> &'static str {
        "clickhouse"
    }
}

// ClickHouse row struct for tps_history
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, clickhouse::Row)]
struct SampleRow {
    record_timestamp: i64, // milliseconds since epoch, DateTime64(3)
    tps: f64,
    mspt: f64,
}

impl From<Sample> for SampleRow {
    fn from(sample: Sample) -> Self {
        Self {
            record_timestamp: sample.record_timestamp.timestamp_millis(),
            tps: sample.tps,
            mspt: sample.mspt,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, clickhouse::Row)]
struct BucketRow {
    bucket: i64, // milliseconds since epoch
    avg_tps: f64,
    min_tps: f64,
    max_tps: f64,
}

impl TryFrom<BucketRow> for Bucket {
    type Error = StoreError;

    fn try_from(row: BucketRow) -> Result<Self, Self::Error> {
        let start = DateTime::from_timestamp_millis(row.bucket).ok_or(StoreError::TimestampOutOfRange(row.bucket))?;
        Ok(Bucket {
            start,
            average: row.avg_tps,
            min: row.min_tps,
            max: row.max_tps,
        })
    }
}
