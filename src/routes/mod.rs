pub mod assets;
pub mod auth;
pub mod home;
pub mod media;
pub mod photos;
pub mod posts;
pub mod upload;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Public prefix stored objects are served under.
pub const MEDIA_PREFIX: &str = "/media";

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes();

    Router::new()
        .route("/", get(home::index))
        .route("/assets/{*path}", get(assets::serve))
        .route("/media/{*name}", get(media::serve))
        .merge(auth::router())
        .merge(posts::router())
        .merge(photos::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}
