#[macro_use]
extern crate tracing;

pub mod error;
pub mod history;
pub mod router;
