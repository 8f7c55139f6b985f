use crate::Collector;
use std::{
    sync::Arc,
    time::Duration,
};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Fires `collector` every `period` until `shutdown` is cancelled.
///
/// Each tick spawns its own task and the loop does not wait for it, so a slow
/// cycle can still be running when the next one starts. Cycles already in
/// flight when `shutdown` fires are left to finish on their own.
pub async fn run_every(collector: Arc<dyn Collector>, period: Duration, shutdown: CancellationToken) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(collector = collector.name(), interval = ?period, "collector scheduled");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!(collector = collector.name(), "collector stopped");
                return;
            }
            _ = ticker.tick() => {
                debug!(collector = collector.name(), "collection tick");
                let collector = collector.clone();
                tokio::spawn(async move {
                    // The outcome is already logged by the collector.
                    let _ = collector.collect().await;
                });
            }
        }
    }
}
