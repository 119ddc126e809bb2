use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

use crate::mailer::MailError;

/// Boundary error for the submission endpoint. Everything the handler can
/// fail with collapses into one of these two outcomes; the response body
/// carries a generic message, never transport details.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("delivery failed: {0}")]
    Delivery(#[from] MailError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(reason) => {
                warn!("rejected submission: {reason}");
                (StatusCode::BAD_REQUEST, "Invalid submission data")
            }
            AppError::Delivery(err) => {
                error!("Error sending email: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to send email")
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
