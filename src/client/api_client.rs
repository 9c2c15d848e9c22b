use crate::client::navigator::Navigator;
use crate::client::preferences::PreferenceStore;
use crate::client::session_store::SessionStore;
use crate::config::Environment;
use crate::error::ClientError;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Runs on every failed request: a 401 forces a sign-out.
#[derive(Clone, Debug)]
pub struct FailureInterceptor {
    session_store: SessionStore,
    preferences: PreferenceStore,
    navigator: Arc<dyn Navigator>,
    sign_in_path: String,
    environment: Environment,
}

impl FailureInterceptor {
    #[must_use]
    pub fn new(
        session_store: SessionStore,
        preferences: PreferenceStore,
        navigator: Arc<dyn Navigator>,
        sign_in_path: String,
        environment: Environment,
    ) -> Self {
        Self { session_store, preferences, navigator, sign_in_path, environment }
    }

    /// Handles a failure and reports whether the session was cleared.
    pub fn on_failure(&self, status: Option<StatusCode>, error: &dyn std::error::Error) -> bool {
        let unauthorized = status == Some(StatusCode::UNAUTHORIZED);
        if unauthorized {
            self.session_store.clear_then(|| {
                self.preferences.reset_auth();
                self.navigator.push(&self.sign_in_path);
            });
        }

        if !self.environment.is_production() {
            tracing::error!(error = %error, status = ?status.map(|s| s.as_u16()), "Error in request");
        }

        unauthorized
    }
}

/// HTTP client for the backend API with the bootstrap's defaults applied to every request.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    authorization: Arc<Mutex<HeaderValue>>,
    interceptor: FailureInterceptor,
}

impl ApiClient {
    /// # Errors
    /// Returns `ClientError::Build` if the underlying HTTP client cannot be constructed.
    pub fn new(
        base_url: &str,
        auth_token: &str,
        tunnel_bypass_header: &str,
        interceptor: FailureInterceptor,
    ) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        match HeaderName::from_bytes(tunnel_bypass_header.as_bytes()) {
            Ok(name) => {
                headers.insert(name, HeaderValue::from_static("true"));
            }
            Err(e) => tracing::warn!(error = %e, header = tunnel_bypass_header, "Invalid tunnel bypass header name"),
        }

        let http = reqwest::Client::builder().default_headers(headers).build().map_err(ClientError::Build)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            authorization: Arc::new(Mutex::new(authorization_value(auth_token))),
            interceptor,
        })
    }

    fn authorization(&self) -> MutexGuard<'_, HeaderValue> {
        self.authorization.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the `Authorization` value sent on subsequent requests.
    pub fn set_authorization(&self, auth_token: &str) {
        *self.authorization() = authorization_value(auth_token);
    }

    #[must_use]
    pub fn current_authorization(&self) -> String {
        self.authorization().to_str().unwrap_or_default().to_string()
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    #[must_use]
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let authorization = self.authorization().clone();
        self.http.request(method, self.url(path)).header(AUTHORIZATION, authorization)
    }

    #[must_use]
    pub fn get(&self, path: &str) -> RequestBuilder {
        self.request(Method::GET, path)
    }

    #[must_use]
    pub fn post(&self, path: &str) -> RequestBuilder {
        self.request(Method::POST, path)
    }

    /// Sends `request`. Transport errors and non-2xx responses are failures: they pass through
    /// the interceptor and are then returned unchanged.
    ///
    /// # Errors
    /// Returns `ClientError::Request` carrying the original failure.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let result = match request.send().await {
            Ok(response) => response.error_for_status(),
            Err(e) => Err(e),
        };

        result.map_err(|e| {
            if self.interceptor.on_failure(e.status(), &e) {
                self.set_authorization("");
            }
            ClientError::Request(e)
        })
    }
}

fn authorization_value(auth_token: &str) -> HeaderValue {
    let mut value = HeaderValue::from_str(auth_token).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Session auth token is not a valid header value; sending none");
        HeaderValue::from_static("")
    });
    value.set_sensitive(true);
    value
}
