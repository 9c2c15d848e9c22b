use crate::config::GuardConfig;
use crate::domain::route::{GuardDecision, RouteClass};
use crate::services::session_codec::SessionCodec;
use opentelemetry::{KeyValue, global, metrics::Counter};
use std::collections::HashSet;

#[derive(Clone, Debug)]
struct Metrics {
    redirects_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("cornerstone");
        Self {
            redirects_total: meter
                .u64_counter("route_guard_redirects_total")
                .with_description("Navigations redirected by the route guard, by route class")
                .build(),
        }
    }
}

/// Per-navigation allow/redirect decision based on route class and session validity.
#[derive(Clone, Debug)]
pub struct RouteGuard {
    protected: HashSet<String>,
    auth_only: HashSet<String>,
    excluded_prefixes: Vec<String>,
    sign_in_path: String,
    home_path: String,
    codec: SessionCodec,
    metrics: Metrics,
}

impl RouteGuard {
    #[must_use]
    pub fn new(config: &GuardConfig, codec: SessionCodec) -> Self {
        Self {
            protected: config.protected_routes.iter().cloned().collect(),
            auth_only: config.auth_routes.iter().cloned().collect(),
            excluded_prefixes: config.excluded_prefixes.iter().filter(|p| !p.is_empty()).cloned().collect(),
            sign_in_path: config.sign_in_path.clone(),
            home_path: config.home_path.clone(),
            codec,
            metrics: Metrics::new(),
        }
    }

    /// Paths under an excluded prefix are never evaluated.
    #[must_use]
    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded_prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Exact-match classification; a path in neither list is public.
    #[must_use]
    pub fn classify(&self, path: &str) -> RouteClass {
        if self.protected.contains(path) {
            RouteClass::Protected
        } else if self.auth_only.contains(path) {
            RouteClass::AuthOnly
        } else {
            RouteClass::Public
        }
    }

    #[must_use]
    pub fn decide(&self, class: RouteClass, has_session: bool) -> GuardDecision {
        match (class, has_session) {
            (RouteClass::Protected, false) => GuardDecision::Redirect(self.sign_in_path.clone()),
            (RouteClass::AuthOnly, true) => GuardDecision::Redirect(self.home_path.clone()),
            _ => GuardDecision::Allow,
        }
    }

    /// Classifies `path`, verifies the session cookie value and decides.
    #[tracing::instrument(level = "debug", skip(self, session_cookie), fields(route_class = tracing::field::Empty))]
    pub fn evaluate(&self, path: &str, session_cookie: Option<&str>) -> GuardDecision {
        let class = self.classify(path);
        tracing::Span::current().record("route_class", class.as_str());

        if class == RouteClass::Public {
            return GuardDecision::Allow;
        }

        let has_session = self.codec.decode(session_cookie).is_some();
        let decision = self.decide(class, has_session);

        if let GuardDecision::Redirect(target) = &decision {
            tracing::debug!(target_path = %target, has_session, "Redirecting navigation");
            self.metrics.redirects_total.add(1, &[KeyValue::new("route_class", class.as_str())]);
        }

        decision
    }
}
