use crate::api::AppState;
use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse},
};

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>{body}</body>\n</html>\n"
    ))
}

pub async fn dashboard() -> impl IntoResponse {
    page(
        "Dashboard",
        "<main id=\"dashboard\"><h1>Dashboard</h1><form method=\"post\" action=\"/signout\"><button>Sign out</button></form></main>",
    )
}

pub async fn sign_in() -> impl IntoResponse {
    page("Sign In", "<main id=\"signin\"><h1>Sign In</h1><a href=\"/signup\">Sign Up</a></main>")
}

pub async fn sign_up() -> impl IntoResponse {
    page("Sign Up", "<main id=\"signup\"><h1>Sign Up</h1><a href=\"/signin\">Sign In</a></main>")
}

pub async fn forgot() -> impl IntoResponse {
    page("Forgot Password", "<main id=\"forgot\"><h1>Forgot Password</h1></main>")
}

pub async fn reset() -> impl IntoResponse {
    page("Reset Password", "<main id=\"reset\"><h1>Reset Password</h1></main>")
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, page("Not Found", "<main id=\"not-found\"><h1>404</h1><a href=\"/\">Home</a></main>"))
}

/// Crawlers may index production only.
pub async fn robots(State(state): State<AppState>) -> impl IntoResponse {
    let disallow = if state.config.environment.is_production() { "" } else { "/" };
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], format!("User-agent: *\nDisallow: {disallow}\n"))
}
