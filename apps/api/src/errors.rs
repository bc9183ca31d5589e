use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::layout::FitError;
use crate::render::RenderError;
use crate::slack_client::SlackError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Slack is not configured")]
    SlackNotConfigured,

    #[error("Slack rejected the token: {0}")]
    SlackUnauthorized(String),

    #[error("Slack error: {0}")]
    Slack(String),

    #[error("Rendering surface unavailable")]
    SurfaceUnavailable,

    #[error("Render error: {0}")]
    Render(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<SlackError> for AppError {
    fn from(err: SlackError) -> Self {
        match err {
            SlackError::Auth(code) => AppError::SlackUnauthorized(code),
            other => AppError::Slack(other.to_string()),
        }
    }
}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        match err {
            FitError::UnavailableSurface => AppError::SurfaceUnavailable,
            other => AppError::Validation(other.to_string()),
        }
    }
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Fit(e) => e.into(),
            RenderError::Color { .. } | RenderError::InvalidOptions(_) => {
                AppError::Validation(err.to_string())
            }
            RenderError::Png(msg) => AppError::Render(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::SlackNotConfigured => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SLACK_NOT_CONFIGURED",
                "No Slack token is configured on the server".to_string(),
            ),
            AppError::SlackUnauthorized(slack_code) => {
                tracing::warn!("Slack rejected the token: {slack_code}");
                (
                    StatusCode::UNAUTHORIZED,
                    "SLACK_UNAUTHORIZED",
                    "The Slack token is invalid or lacks emoji permissions".to_string(),
                )
            }
            AppError::Slack(msg) => {
                tracing::error!("Slack error: {msg}");
                (StatusCode::BAD_GATEWAY, "SLACK_ERROR", msg.clone())
            }
            AppError::SurfaceUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SURFACE_UNAVAILABLE",
                "No fonts are loaded; text cannot be measured".to_string(),
            ),
            AppError::Render(msg) => {
                tracing::error!("Render error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RENDER_ERROR",
                    "The emoji could not be rendered".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
