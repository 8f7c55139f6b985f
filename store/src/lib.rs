//! # TPS History Store
//!
//! Shared storage for the collector and the query API.
//!
//! ## Key Components
//!
//! - **`Sample`**: one stored TPS/MSPT measurement
//! - **`Period`**: the closed set of query periods and their lookback/bucket widths
//! - **`HistoryStore`**: the storage seam both workflows talk to
//! - **`ClickHouseStore`**: production backend writing to the `tps_history` table
//! - **`MemoryStore`**: in-process backend with the same semantics

#[macro_use]
extern crate tracing;

mod backend;
mod error;
mod period;
mod sample;

pub use backend::{
    ClickHouseStore,
    MemoryStore,
};
pub use error::StoreError;
pub use period::Period;
pub use sample::{
    Bucket,
    Sample,
};
use chrono::{
    DateTime,
    Utc,
};
use std::{
    future::Future,
    pin::Pin,
};

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Append-only sample history with time-bucketed reads.
pub trait HistoryStore: Send + Sync {
    /// Append one sample. Either the whole row is written or nothing is.
    fn insert(&self, sample: Sample) -> StoreFuture<'_, ()>;

    /// Aggregate the samples inside `period`'s lookback window ending at `now`,
    /// one bucket per populated bucket width, ordered ascending by bucket start.
    fn buckets(&self, period: Period, now: DateTime<Utc>) -> StoreFuture<'_, Vec<Bucket>>;

    /// Get the name of this backend
    fn name(&self) -> &'static str;
}
