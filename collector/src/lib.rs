//! # TPS Collector
//!
//! Pulls the current TPS/MSPT reading from the source API and appends it to
//! the history store, once per tick.
//!
//! ## Architecture
//!
//! - **`SourceClient`**: one GET against the source endpoint, with failures classified
//! - **`payload`**: turns the raw JSON into a [`Sample`](tps_history_store::Sample) or says which field is bad
//! - **`TpsCollector`**: one fetch-validate-store cycle, logging its outcome
//! - **`scheduler`**: fires a [`Collector`] on a fixed interval without waiting for earlier cycles
//!
//! A failed cycle is logged and forgotten. The next tick is the only retry.

#[macro_use]
extern crate tracing;

mod collector;
mod error;
pub mod payload;
pub mod scheduler;
mod source;

pub use collector::{
    Collector,
    CycleOutcome,
    TpsCollector,
};
pub use error::{
    CollectError,
    InvalidPayload,
};
pub use source::SourceClient;
