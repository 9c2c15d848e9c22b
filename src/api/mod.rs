use crate::adapters::upstream::CredentialIssuer;
use crate::config::Config;
use crate::services::route_guard::RouteGuard;
use crate::services::session_codec::SessionCodec;
use crate::services::sign_in_service::SignInService;
use axum::body::Body;
use axum::http::Request;
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod health;
pub mod middleware;
pub mod pages;

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Config,
    pub guard: RouteGuard,
    pub sign_in_service: SignInService,
}

impl AppState {
    #[must_use]
    pub fn new(config: Config, issuer: Arc<dyn CredentialIssuer>) -> Self {
        let codec = SessionCodec::from_config(&config.session);
        let guard = RouteGuard::new(&config.guard, codec.clone());
        let sign_in_service = SignInService::new(issuer, codec);
        Self { config, guard, sign_in_service }
    }
}

/// Configures and returns the dashboard router with the route guard in front of every page.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::dashboard))
        .route("/signin", get(pages::sign_in).post(auth::sign_in))
        .route("/signup", get(pages::sign_up))
        .route("/forgot", get(pages::forgot))
        .route("/reset", get(pages::reset))
        .route("/signout", post(auth::sign_out))
        .route("/robots.txt", get(pages::robots))
        .route("/api/health", get(health::livez))
        .fallback(pages::not_found)
        .layer(from_fn_with_state(state.clone(), middleware::route_guard))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|id| id.to_str().ok())
                        .unwrap_or_default()
                        .to_string();

                    tracing::info_span!(
                        "request",
                        "request_id" = %request_id,
                        "http.request.method" = %request.method(),
                        "url.path" = %request.uri().path(),
                        "http.response.status_code" = tracing::field::Empty,
                        "otel.kind" = "server",
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: std::time::Duration, span: &tracing::Span| {
                        let status = response.status();
                        span.record("http.response.status_code", status.as_u16());

                        tracing::info!(
                            latency_ms = %latency.as_millis(),
                            status = %status.as_u16(),
                            "request completed"
                        );
                    },
                )
                .on_failure(|error, _latency, _span: &tracing::Span| {
                    tracing::error!(error = %error, "request failed");
                }),
        )
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}
