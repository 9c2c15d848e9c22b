use crate::api::AppState;
use crate::config::{Environment, SessionConfig};
use crate::domain::session::expiry_after;
use crate::domain::sign_in::SignInForm;
use crate::error::Result;
use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::OffsetDateTime;

/// `POST /signin`: exchanges credentials for a session cookie and redirects home.
pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(form): Json<SignInForm>,
) -> Result<impl IntoResponse> {
    let token = state.sign_in_service.sign_in(&form).await?;
    let cookie = session_cookie(&state.config.session, state.config.environment, token);
    Ok((jar.add(cookie), Redirect::to(&state.config.guard.home_path)))
}

/// `POST /signout`: drop the session cookie and return to sign-in.
pub async fn sign_out(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let removal = Cookie::build((state.config.session.cookie_name.clone(), "")).path("/");
    tracing::info!("Session cookie removed");
    (jar.remove(removal), Redirect::to(&state.config.guard.sign_in_path))
}

/// Readable by the client bootstrap, so not `HttpOnly`.
fn session_cookie(config: &SessionConfig, environment: Environment, token: String) -> Cookie<'static> {
    let cookie = Cookie::build((config.cookie_name.clone(), token))
        .path("/")
        .same_site(SameSite::Lax)
        .secure(environment.is_production());
    match expiry_after(OffsetDateTime::now_utc(), config.ttl_days) {
        Some(expires) => cookie.expires(expires).build(),
        None => cookie.build(),
    }
}
