#![allow(clippy::unwrap_used, clippy::panic, clippy::missing_panics_doc, unreachable_pub)]
use reqwest::{StatusCode, header};
use serde_json::json;

mod common;

async fn spawn_with_api() -> common::TestApp {
    let mut config = common::get_test_config();
    config.client.api_base_url = common::spawn_mock_api().await;
    common::TestApp::spawn_with_config(config).await
}

#[tokio::test]
async fn test_sign_in_sets_session_cookie_and_redirects_home() {
    let app = spawn_with_api().await;

    let resp = app
        .client
        .post(format!("{}/signin", app.server_url))
        .json(&json!({ "email": "admin@example.com", "password": common::GOOD_PASSWORD }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::location(&resp).as_deref(), Some("/"));

    let set_cookie = common::session_set_cookie(&resp).expect("Missing session cookie");
    assert!(set_cookie.contains("Path=/"));
    assert!(set_cookie.contains("Expires="));
    assert!(!set_cookie.contains("HttpOnly"));

    let token = set_cookie.trim_start_matches("session=").split(';').next().unwrap().to_string();
    let payload = app.codec.decode(Some(&token)).unwrap();
    assert_eq!(payload.auth_token, format!("Bearer {}", common::GOOD_ACCESS_TOKEN));

    // The new session opens the dashboard and closes the sign-in page.
    assert_eq!(app.get("/", Some(&token)).await.status(), StatusCode::OK);
    assert_eq!(app.get("/signin", Some(&token)).await.status(), StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn test_invalid_form_is_rejected_before_upstream() {
    let app = spawn_with_api().await;

    let resp = app
        .client
        .post(format!("{}/signin", app.server_url))
        .json(&json!({ "email": "not-an-email", "password": common::GOOD_PASSWORD }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(common::session_set_cookie(&resp).is_none());
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Email must be a valid email");
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let app = spawn_with_api().await;

    let resp = app
        .client
        .post(format!("{}/signin", app.server_url))
        .json(&json!({ "email": "admin@example.com", "password": "wrong-password" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(common::session_set_cookie(&resp).is_none());
}

#[tokio::test]
async fn test_unreachable_api_is_bad_gateway() {
    let mut config = common::get_test_config();
    config.client.api_base_url = "http://127.0.0.1:1".to_string();
    let app = common::TestApp::spawn_with_config(config).await;

    let resp = app
        .client
        .post(format!("{}/signin", app.server_url))
        .json(&json!({ "email": "admin@example.com", "password": common::GOOD_PASSWORD }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_missing_secret_fails_session_creation() {
    let mut config = common::get_test_config();
    config.client.api_base_url = common::spawn_mock_api().await;
    config.session.secret = String::new();
    let app = common::TestApp::spawn_with_config(config).await;

    let resp = app
        .client
        .post(format!("{}/signin", app.server_url))
        .json(&json!({ "email": "admin@example.com", "password": common::GOOD_PASSWORD }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(common::session_set_cookie(&resp).is_none());
}

#[tokio::test]
async fn test_sign_in_while_signed_in_replaces_session() {
    let app = spawn_with_api().await;
    let old_token = app.session_token("stale-token");

    let resp = app
        .client
        .post(format!("{}/signin", app.server_url))
        .header(header::COOKIE, format!("session={old_token}"))
        .json(&json!({ "email": "admin@example.com", "password": common::GOOD_PASSWORD }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::location(&resp).as_deref(), Some("/"));
    let set_cookie = common::session_set_cookie(&resp).expect("Missing session cookie");
    let token = set_cookie.trim_start_matches("session=").split(';').next().unwrap().to_string();
    let payload = app.codec.decode(Some(&token)).unwrap();
    assert_eq!(payload.auth_token, format!("Bearer {}", common::GOOD_ACCESS_TOKEN));
}

#[tokio::test]
async fn test_sign_out_removes_cookie() {
    let app = common::TestApp::spawn().await;
    let token = app.session_token("abc");

    let resp = app
        .client
        .post(format!("{}/signout", app.server_url))
        .header(header::COOKIE, format!("session={token}"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::location(&resp).as_deref(), Some("/signin"));
    let set_cookie = common::session_set_cookie(&resp).expect("Missing removal cookie");
    assert!(set_cookie.starts_with("session=;"));
    assert!(set_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_sign_out_without_session_sets_no_cookie() {
    let app = common::TestApp::spawn().await;

    let resp = app.client.post(format!("{}/signout", app.server_url)).send().await.unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::location(&resp).as_deref(), Some("/signin"));
    assert!(common::session_set_cookie(&resp).is_none());
}

#[tokio::test]
async fn test_robots_policy_follows_environment() {
    let app = common::TestApp::spawn().await;
    let body = app.get("/robots.txt", None).await.text().await.unwrap();
    assert!(body.contains("Disallow: /"));

    let mut config = common::get_test_config();
    config.environment = cornerstone::config::Environment::Production;
    let app = common::TestApp::spawn_with_config(config).await;
    let body = app.get("/robots.txt", None).await.text().await.unwrap();
    assert!(body.contains("Disallow: \n"));
}
