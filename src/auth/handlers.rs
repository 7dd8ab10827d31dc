use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use crate::auth::session;
use crate::db::models::NewUser;
use crate::db::users;
use crate::error::{AppError, AppResult};
use crate::extractors::{CurrentUser, SessionToken};
use crate::state::AppState;

// -- Request types --

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: Option<String>,
    /// Display name; only used when the email was never registered
    pub username: Option<String>,
}

#[derive(Deserialize)]
pub struct RegisterForm {
    pub email: Option<String>,
    pub username: Option<String>,
}

// -- Cookie helpers --

fn session_cookie(name: &str, token: &str, max_age_hours: u64) -> String {
    let max_age_secs = max_age_hours * 3600;
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        name, token, max_age_secs
    )
}

fn clear_session_cookie(name: &str) -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", name)
}

fn field(value: Option<String>, name: &'static str) -> AppResult<String> {
    value.ok_or(AppError::MissingField(name))
}

/// Start a session for `user` and send the browser home.
fn start_session(state: &AppState, user: &CurrentUser) -> AppResult<Response> {
    let hours = state.config.auth.session_hours;
    let token = session::create_session(&state.db, user, hours)?;
    let cookie = session_cookie(&state.config.auth.cookie_name, &token, hours);

    Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response())
}

/// Pick the name a login is shown under: the registered username, else the
/// submitted display name, else the email itself.
pub fn login_name(registered: Option<String>, display_name: Option<&str>, email: &str) -> String {
    registered
        .or_else(|| {
            display_name
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| email.to_string())
}

// -- Handlers --

/// POST /login: trust the submitted email and start a session
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> AppResult<Response> {
    let email = field(form.email, "email")?.trim().to_string();
    if email.is_empty() {
        return Err(AppError::MissingField("email"));
    }

    let registered = users::find_user(&state.db, &email)?.map(|u| u.username);
    let username = login_name(registered, form.username.as_deref(), &email);

    tracing::info!("Login as {} ({})", username, email);
    start_session(&state, &CurrentUser { email, username })
}

/// POST /register: write the user record and start a session
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    let email = field(form.email, "email")?;
    let username = field(form.username, "username")?;
    let user = NewUser::new(&email, &username)?;

    users::put_user(&state.db, &user)?;
    tracing::info!("Registered {} ({})", user.username, user.email);

    start_session(
        &state,
        &CurrentUser {
            email: user.email,
            username: user.username,
        },
    )
}

/// GET /logout: forget the session
pub async fn logout(
    State(state): State<AppState>,
    SessionToken(token): SessionToken,
) -> AppResult<Response> {
    if let Some(token) = token {
        session::delete_session(&state.db, &token)?;
    }

    Ok((
        [(
            header::SET_COOKIE,
            clear_session_cookie(&state.config.auth.cookie_name),
        )],
        Redirect::to("/"),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_username_wins() {
        assert_eq!(
            login_name(Some("alice".into()), Some("Al"), "a@x.com"),
            "alice"
        );
    }

    #[test]
    fn display_name_used_for_unregistered_email() {
        assert_eq!(login_name(None, Some(" Al "), "a@x.com"), "Al");
    }

    #[test]
    fn email_is_the_last_resort() {
        assert_eq!(login_name(None, Some("  "), "a@x.com"), "a@x.com");
        assert_eq!(login_name(None, None, "a@x.com"), "a@x.com");
    }

    #[test]
    fn cookies_carry_configured_name() {
        assert_eq!(
            session_cookie("snap", "tok", 2),
            "snap=tok; HttpOnly; SameSite=Lax; Path=/; Max-Age=7200"
        );
        assert!(clear_session_cookie("snap").contains("Max-Age=0"));
    }
}
