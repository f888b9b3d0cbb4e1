use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::leaderboard::{ErrorKind, LeaderboardError, LeaderboardService};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub leaderboard_service: Arc<LeaderboardService>,
    /// Deadline after which an in-flight request is cancelled
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(leaderboard_service: Arc<LeaderboardService>, request_timeout: Duration) -> Self {
        Self {
            leaderboard_service,
            request_timeout,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Request timed out")]
    Timeout,
}

impl From<LeaderboardError> for AppError {
    fn from(err: LeaderboardError) -> Self {
        match err.kind() {
            ErrorKind::NotFound => AppError::NotFound(err.to_string()),
            ErrorKind::InvalidInput => AppError::BadRequest(err.to_string()),
            ErrorKind::UpstreamFailure => AppError::Upstream(err.to_string()),
            ErrorKind::StorageFailure => AppError::Storage(err.to_string()),
            ErrorKind::Cancelled => AppError::Timeout,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Storage(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Storage error: {}", msg),
            ),
            AppError::Timeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "Request timed out".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
