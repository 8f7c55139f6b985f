use axum::{
    http::StatusCode,
    response::{
        IntoResponse,
        Response,
    },
};
use tps_history_store::StoreError;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("internal server error")]
    Storage(#[from] StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Details stay in the log, the caller only learns that it failed.
        match &self {
            AppError::Storage(e) => error!(error = %e, "history query failed"),
        }

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            axum::Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}
