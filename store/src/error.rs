#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("ClickHouse request failed: {0}")]
    ClickHouse(#[from] clickhouse::error::Error),
    #[error("Bucket timestamp {0}ms is out of range")]
    TimestampOutOfRange(i64),
}
