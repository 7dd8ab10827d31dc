use askama::Template;
use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;

use crate::db::models::NewPost;
use crate::db::posts;
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::labeling::ImageSource;
use crate::routes::home::Html;
use crate::routes::upload::UploadForm;
use crate::state::AppState;
use crate::storage;

#[derive(Template)]
#[template(path = "pages/new_post.html")]
pub struct NewPostTemplate {
    pub username: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/newpost", get(new_post))
        .route("/addpost", post(add_post))
}

/// GET /newpost: upload form
async fn new_post(user: CurrentUser) -> AppResult<Response> {
    Ok(Html(NewPostTemplate {
        username: user.username,
    })
    .into_response())
}

/// POST /addpost: store the photo, label it, then record the post
async fn add_post(
    State(state): State<AppState>,
    user: CurrentUser,
    multipart: Multipart,
) -> AppResult<Response> {
    let mut form = UploadForm::read(multipart).await?;
    let description = form
        .description
        .take()
        .ok_or(AppError::MissingField("description"))?;
    let upload = form.take_file()?;

    let object_name = storage::object_name(upload.filename.as_deref());
    let stored = state
        .storage
        .put(&object_name, upload.data.clone(), &upload.content_type())
        .await?;

    let labels = state
        .labeler
        .detect_labels(ImageSource {
            uri: &stored.source_uri,
            content: &upload.data,
        })
        .await?;

    let post = NewPost::new(
        &stored.name,
        &user.email,
        &user.username,
        &stored.public_url,
        &description,
        &labels,
    )?;
    posts::put_post(&state.db, &post)?;

    tracing::info!(
        "{} posted {} to bucket {} ({} bytes, {} labels)",
        user.email,
        stored.name,
        state.storage.bucket(),
        upload.data.len(),
        labels.len()
    );

    Ok(Redirect::to("/").into_response())
}
