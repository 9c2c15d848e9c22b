#![allow(dead_code, clippy::unwrap_used, clippy::missing_panics_doc, unreachable_pub)]
use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use cornerstone::adapters::upstream::UpstreamIssuer;
use cornerstone::api::{AppState, app_router};
use cornerstone::config::Config;
use cornerstone::domain::session::SessionInfo;
use cornerstone::services::session_codec::SessionCodec;
use serde_json::json;
use std::sync::{Arc, Once};

static INIT: Once = Once::new();

pub const GOOD_ACCESS_TOKEN: &str = "good-token";
pub const GOOD_PASSWORD: &str = "password123";

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("cornerstone=debug".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap());

        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    });
}

pub fn get_test_config() -> Config {
    let mut config = Config::try_parse_from(["cornerstone"]).unwrap();
    config.session.secret = "test_secret".to_string();
    config.server.host = "127.0.0.1".to_string();
    config.server.port = 0;
    config
}

pub struct TestApp {
    pub server_url: String,
    pub client: reqwest::Client,
    pub config: Config,
    pub codec: SessionCodec,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_config(get_test_config()).await
    }

    pub async fn spawn_with_config(config: Config) -> Self {
        setup_tracing();

        let issuer = Arc::new(UpstreamIssuer::new(reqwest::Client::new(), &config.client.api_base_url));
        let app = app_router(AppState::new(config.clone(), issuer));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none()).build().unwrap();

        Self {
            server_url: format!("http://{addr}"),
            client,
            codec: SessionCodec::from_config(&config.session),
            config,
        }
    }

    pub fn session_token(&self, access_token: &str) -> String {
        self.codec.encode(&SessionInfo::new(access_token)).unwrap()
    }

    pub async fn get(&self, path: &str, session: Option<&str>) -> reqwest::Response {
        let mut request = self.client.get(format!("{}{path}", self.server_url));
        if let Some(token) = session {
            request = request.header(header::COOKIE, format!("session={token}"));
        }
        request.send().await.unwrap()
    }
}

/// Value of the `session` cookie set by `resp`, if any.
pub fn session_set_cookie(resp: &reqwest::Response) -> Option<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("session="))
        .map(String::from)
}

pub fn location(resp: &reqwest::Response) -> Option<String> {
    resp.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()).map(String::from)
}

async fn mock_sign_in(Json(body): Json<serde_json::Value>) -> Response {
    if body["password"] == GOOD_PASSWORD {
        Json(json!({ "accessToken": GOOD_ACCESS_TOKEN, "tokenType": "Bearer" })).into_response()
    } else {
        StatusCode::UNAUTHORIZED.into_response()
    }
}

async fn mock_me(headers: HeaderMap) -> Response {
    let expected = format!("Bearer {GOOD_ACCESS_TOKEN}");
    let authorized = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) == Some(expected.as_str())
        && headers.get("ngrok-skip-browser-warning").and_then(|v| v.to_str().ok()) == Some("true");

    if authorized {
        Json(json!({ "email": "admin@example.com" })).into_response()
    } else {
        StatusCode::UNAUTHORIZED.into_response()
    }
}

async fn mock_broken() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

/// Starts a stand-in for the backend API and returns its base URL.
pub async fn spawn_mock_api() -> String {
    let app = Router::new()
        .route("/auth/signin", post(mock_sign_in))
        .route("/users/me", get(mock_me))
        .route("/broken", get(mock_broken));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}
