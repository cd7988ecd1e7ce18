use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found")]
    NotFound,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Canvas API error {status}: {body}")]
    Canvas { status: u16, body: String },

    #[error("Notion API error {status}: {body}")]
    Notion { status: u16, body: String },

    #[error("Request failed: {0}")]
    Http(String),
}

impl AppError {
    pub fn canvas(status: reqwest::StatusCode, body: String) -> Self {
        AppError::Canvas { status: status.as_u16(), body }
    }

    pub fn notion(status: reqwest::StatusCode, body: String) -> Self {
        AppError::Notion { status: status.as_u16(), body }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Http(err.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            AppError::Configuration(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Canvas { status, body } => (
                StatusCode::BAD_GATEWAY,
                format!("Canvas API error {}: {}", status, body),
            ),
            AppError::Notion { status, body } => (
                StatusCode::BAD_GATEWAY,
                format!("Notion API error {}: {}", status, body),
            ),
            AppError::Http(msg) => {
                error!("upstream request failed: {}", msg);
                (StatusCode::BAD_GATEWAY, "Upstream request failed".to_string())
            }
            AppError::Database(e) => {
                error!("database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: error_message,
        });

        (status, body).into_response()
    }
}
