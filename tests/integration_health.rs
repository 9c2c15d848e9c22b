#![allow(clippy::unwrap_used, clippy::panic, clippy::missing_panics_doc, unreachable_pub)]
use axum::http::StatusCode;
mod common;

#[tokio::test]
async fn test_livez() {
    let app = common::TestApp::spawn().await;

    let resp = app.get("/api/health", None).await;

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_livez_ignores_invalid_session() {
    let app = common::TestApp::spawn().await;

    let resp = app.get("/api/health", Some("not-a-token")).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(common::location(&resp), None);
}

#[tokio::test]
async fn test_robots_is_public() {
    let app = common::TestApp::spawn().await;
    let token = app.session_token("abc");

    for session in [None, Some(token.as_str())] {
        let resp = app.get("/robots.txt", session).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["content-type"], "text/plain; charset=utf-8");
    }
}
