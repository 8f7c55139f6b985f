use crate::{
    Bucket,
    HistoryStore,
    Period,
    Sample,
    StoreFuture,
};
use chrono::{
    DateTime,
    Utc,
};
use std::{
    collections::BTreeMap,
    sync::Arc,
};
use tokio::sync::RwLock;

/// In-process [`HistoryStore`]. Nothing survives a restart.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    samples: Arc<RwLock<Vec<Sample>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored sample in insertion order.
    pub async fn samples(&self) -> Vec<Sample> {
        self.samples.read().await.clone()
    }
}

struct Aggregate {
    sum: f64,
    count: u32,
    min: f64,
    max: f64,
}

impl Aggregate {
    fn new(tps: f64) -> Self {
        Self {
            sum: tps,
            count: 1,
            min: tps,
            max: tps,
        }
    }

    fn add(&mut self, tps: f64) {
        self.sum += tps;
        self.count += 1;
        self.min = self.min.min(tps);
        self.max = self.max.max(tps);
    }
}

impl HistoryStore for MemoryStore {
    fn insert(&self, sample: Sample) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            self.samples.write().await.push(sample);
            Ok(())
        })
    }

    fn buckets(&self, period: Period, now: DateTime<Utc>) -> StoreFuture<'_, Vec<Bucket>> {
        Box::pin(async move {
            let since = period.since(now);
            let mut groups: BTreeMap<DateTime<Utc>, Aggregate> = BTreeMap::new();

            for sample in self.samples.read().await.iter() {
                if sample.record_timestamp < since {
                    continue;
                }
                groups
                    .entry(period.bucket_start(sample.record_timestamp))
                    .and_modify(|agg| agg.add(sample.tps))
                    .or_insert_with(|| Aggregate::new(sample.tps));
            }

            Ok(groups
                .into_iter()
                .map(|(start, agg)| Bucket {
                    start,
                    average: agg.sum / agg.count as f64,
                    min: agg.min,
                    max: agg.max,
                })
                .collect())
        })
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
