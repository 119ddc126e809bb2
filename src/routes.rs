use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, Method},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::{
    config::AllowedOrigin,
    error::AppError,
    render::render_html,
    submission::{Submission, SubmissionKind},
    Mailer,
};

/// Request bodies above this size are rejected before any parsing.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Process-wide dependencies, built once at startup and shared by handlers.
#[derive(Clone)]
pub struct AppState {
    pub mailer: Mailer,
}

pub fn app(state: AppState, origin: &AllowedOrigin) -> Router {
    let cors = match origin {
        AllowedOrigin::Any => CorsLayer::new().allow_origin(Any),
        AllowedOrigin::Origin(value) => CorsLayer::new().allow_origin(value.clone()),
    }
    .allow_methods([Method::POST])
    .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(index))
        .route("/send-email", post(send_email))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

async fn index() -> &'static str {
    "Backend API is running successfully 🚀"
}

#[derive(Debug, Serialize)]
struct SendResponse {
    message: &'static str,
}

async fn send_email(
    State(state): State<AppState>,
    submission: Submission,
) -> Result<Json<SendResponse>, AppError> {
    let kind = SubmissionKind::from_tag(submission.meta.kind.as_deref());
    info!(
        kind = kind.title(),
        fields = submission.form_data.len(),
        attachment = submission.attachment.is_some(),
        "handling form submission"
    );

    let html = render_html(&submission, kind);
    state
        .mailer
        .deliver(kind.subject(), html, submission.attachment)
        .await?;

    Ok(Json(SendResponse {
        message: "Email sent successfully",
    }))
}
