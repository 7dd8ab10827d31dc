use axum::extract::multipart::MultipartError;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::db::models::ValidationError;
use crate::feed::FeedError;
use crate::labeling::LabelError;
use crate::storage::StorageError;

const INTERNAL_ERROR_PAGE: &str = "<!DOCTYPE html>
<html><head><title>Error</title></head>
<body><p>An internal error occurred.</p><p>See logs for full details.</p></body>
</html>";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Missing form field: {0}")]
    MissingField(&'static str),

    #[error("Not found")]
    NotFound,

    #[error("Invalid record: {0}")]
    Validation(#[from] ValidationError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Labeling error: {0}")]
    Labeling(#[from] LabelError),

    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Upload error: {0}")]
    Multipart(#[from] MultipartError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            AppError::MissingField(field) => {
                (StatusCode::BAD_REQUEST, format!("Missing form field: {}", field))
            }
            AppError::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::Multipart(e) => (e.status(), e.body_text()),
            _ => {
                tracing::error!(error = ?self, "An error occurred during a request: {}", self);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                    INTERNAL_ERROR_PAGE,
                )
                    .into_response();
            }
        };

        (status, message).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
