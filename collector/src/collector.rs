use crate::{
    payload,
    CollectError,
    SourceClient,
};
use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
};
use tps_history_store::{
    HistoryStore,
    Sample,
};

pub type CycleOutcome = Result<Sample, CollectError>;

/// Trait for one unit of scheduled collection work
pub trait Collector: Send + Sync {
    /// Run one complete cycle. Failures end the cycle, never the caller.
    fn collect(&self) -> Pin<Box<dyn Future<Output = CycleOutcome> + Send + '_>>;

    /// Get the name of this collector
    fn name(&self) -> &'static str;
}

/// Fetches one TPS/MSPT reading and appends it to the history store.
pub struct TpsCollector {
    source: SourceClient,
    store: Arc<dyn HistoryStore>,
}

impl TpsCollector {
    pub fn new(source: SourceClient, store: Arc<dyn HistoryStore>) -> Self {
        Self { source, store }
    }

    async fn fetch_and_store(&self) -> CycleOutcome {
        let body = self.source.fetch().await?;
        let sample = payload::parse_sample(&body)?;
        self.store.insert(sample).await?;
        Ok(sample)
    }
}

impl Collector for TpsCollector {
    fn collect(&self) -> Pin<Box<dyn Future<Output = CycleOutcome> + Send + '_>> {
        Box::pin(async move {
            let outcome = self.fetch_and_store().await;
            log_outcome(&outcome);
            outcome
        })
    }

    fn name(&self) -> &'static str {
        "tps"
    }
}

fn log_outcome(outcome: &CycleOutcome) {
    match outcome {
        Ok(sample) => info!(
            timestamp = %sample.record_timestamp.to_rfc3339(),
            tps = sample.tps,
            mspt = sample.mspt,
            "stored tps sample"
        ),
        Err(CollectError::Unreachable(e)) => error!(error = %e, "network error: no response from source API"),
        Err(CollectError::Transport(e)) => error!(error = %e, "transport error: malformed response from source API"),
        Err(CollectError::Status { status }) => error!(
            status = status.as_u16(),
            reason = status.canonical_reason().unwrap_or("unknown"),
            "source API error response"
        ),
        Err(CollectError::InvalidData(e)) => warn!(error = %e, "dropping invalid data from source API"),
        Err(CollectError::Storage(e)) => error!(error = %e, "failed to store tps sample"),
    }
}
