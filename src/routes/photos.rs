use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::post;
use axum::Router;

use crate::db::faces;
use crate::db::models::Face;
use crate::error::AppResult;
use crate::labeling::ImageSource;
use crate::routes::upload::UploadForm;
use crate::state::AppState;
use crate::storage;

pub fn router() -> Router<AppState> {
    Router::new().route("/upload_photo", post(upload_photo))
}

/// POST /upload_photo: store the photo and record how joyful its first face looks
async fn upload_photo(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Response> {
    let upload = UploadForm::read(multipart).await?.take_file()?;

    let object_name = storage::object_name(upload.filename.as_deref());
    let stored = state
        .storage
        .put(&object_name, upload.data.clone(), &upload.content_type())
        .await?;

    let joy = state
        .labeler
        .detect_joy(ImageSource {
            uri: &stored.source_uri,
            content: &upload.data,
        })
        .await?;

    let face = Face::new(&stored.name, &stored.public_url, joy)?;
    faces::put_face(&state.db, &face)?;

    tracing::info!(
        "Face photo {} in bucket {}: joy {}",
        stored.name,
        state.storage.bucket(),
        joy
    );

    Ok(Redirect::to("/").into_response())
}
