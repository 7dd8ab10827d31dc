use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::storage::StorageError;

/// A 200 response browsers may cache for a day.
pub fn cached(content_type: String, body: impl IntoResponse) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, "public, max-age=86400".to_string()),
        ],
        body,
    )
        .into_response()
}

/// GET /media/{*name}: serve an object from the bucket
pub async fn serve(State(state): State<AppState>, Path(name): Path<String>) -> AppResult<Response> {
    match state.storage.get(&name).await {
        Ok(Some(object)) => Ok(cached(object.content_type, object.data)),
        Ok(None) | Err(StorageError::InvalidName(_)) => Err(AppError::NotFound),
        Err(e) => Err(e.into()),
    }
}
