use askama::Template;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::db::{posts, users};
use crate::error::AppResult;
use crate::extractors::MaybeUser;
use crate::feed::{self, PostView};
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/login.html")]
pub struct LoginTemplate;

#[derive(Template)]
#[template(path = "pages/feed.html")]
pub struct FeedTemplate {
    pub username: String,
    pub posts: Vec<PostView>,
}

/// Wrapper to render askama templates as axum responses
pub struct Html<T: Template>(pub T);

impl<T: Template> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Template render error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}

/// GET /: the feed when logged in, otherwise the login page
pub async fn index(State(state): State<AppState>, maybe_user: MaybeUser) -> AppResult<Response> {
    let Some(user) = maybe_user.0 else {
        return Ok(Html(LoginTemplate).into_response());
    };

    // The registered name wins over the one captured at login
    let username = users::find_user(&state.db, &user.email)?
        .map(|registered| registered.username)
        .unwrap_or(user.username);

    let records = posts::recent_posts(&state.db)?;
    let posts = feed::assemble(records)?;

    Ok(Html(FeedTemplate {
        username,
        posts,
    })
    .into_response())
}
