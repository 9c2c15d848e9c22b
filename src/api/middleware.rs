use crate::api::AppState;
use crate::domain::route::GuardDecision;
use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};

/// Runs the route guard before page navigations (`GET`/`HEAD`). Form posts and excluded
/// paths skip it entirely.
pub async fn route_guard(State(state): State<AppState>, jar: CookieJar, request: Request, next: Next) -> Response {
    let decision = {
        let path = request.uri().path();
        let navigation = matches!(*request.method(), Method::GET | Method::HEAD);
        if !navigation || state.guard.is_excluded(path) {
            GuardDecision::Allow
        } else {
            let cookie = jar.get(&state.config.session.cookie_name).map(Cookie::value);
            state.guard.evaluate(path, cookie)
        }
    };

    match decision {
        GuardDecision::Allow => next.run(request).await,
        GuardDecision::Redirect(target) => Redirect::temporary(&target).into_response(),
    }
}
