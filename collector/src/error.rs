use reqwest::StatusCode;
use tps_history_store::StoreError;

/// Why a collection cycle did not store a sample.
#[derive(thiserror::Error, Debug)]
pub enum CollectError {
    #[error("No response from source API: {0}")]
    Unreachable(#[source] reqwest::Error),
    #[error("Malformed response from source API: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("Source API answered {status}")]
    Status { status: StatusCode },
    #[error("Source API returned invalid data: {0}")]
    InvalidData(#[from] InvalidPayload),
    #[error("Failed to store sample: {0}")]
    Storage(#[from] StoreError),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum InvalidPayload {
    #[error("expected a JSON object, got {0}")]
    NotAnObject(String),
    #[error("field `{field}` is missing")]
    Missing { field: &'static str },
    #[error("field `{field}` is not a finite number: {value}")]
    NotANumber { field: &'static str, value: String },
    #[error("field `{field}` is not a valid timestamp: {value}")]
    NotATimestamp { field: &'static str, value: String },
}
