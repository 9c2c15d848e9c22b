use crate::config::SessionConfig;
use crate::domain::session::{SessionClaims, SessionInfo, SessionPayload, expiry_after};
use crate::error::SessionError;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use opentelemetry::{KeyValue, global, metrics::Counter};
use std::fmt;
use time::OffsetDateTime;

#[derive(Clone, Debug)]
struct Metrics {
    encode_total: Counter<u64>,
    decode_failures_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("cornerstone");
        Self {
            encode_total: meter
                .u64_counter("session_encode_total")
                .with_description("Total number of session tokens signed")
                .build(),
            decode_failures_total: meter
                .u64_counter("session_decode_failures_total")
                .with_description("Session tokens that failed verification, by reason")
                .build(),
        }
    }
}

/// Signs and verifies session tokens (HS256 JWT).
#[derive(Clone)]
pub struct SessionCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_days: i64,
    has_secret: bool,
    metrics: Metrics,
}

impl fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCodec").field("ttl_days", &self.ttl_days).field("has_secret", &self.has_secret).finish_non_exhaustive()
    }
}

impl SessionCodec {
    #[must_use]
    pub fn new(secret: &str, ttl_days: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_days,
            has_secret: !secret.is_empty(),
            metrics: Metrics::new(),
        }
    }

    #[must_use]
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(&config.secret, config.ttl_days)
    }

    #[must_use]
    pub const fn ttl_days(&self) -> i64 {
        self.ttl_days
    }

    /// Signs a session for `info`, issued now.
    ///
    /// # Errors
    /// Returns `SessionError` if no secret is configured or signing fails.
    pub fn encode(&self, info: &SessionInfo) -> Result<String, SessionError> {
        self.encode_at(info, OffsetDateTime::now_utc())
    }

    /// Signs a session for `info` as if issued at `issued_at`.
    ///
    /// The `exp` claim is always `issued_at + ttl`; `expiresAt` defaults to the same instant.
    ///
    /// # Errors
    /// Returns `SessionError` if no secret is configured, the lifetime is not positive or
    /// overflows the calendar, or signing fails.
    #[tracing::instrument(skip_all, err(level = "warn"))]
    pub fn encode_at(&self, info: &SessionInfo, issued_at: OffsetDateTime) -> Result<String, SessionError> {
        if !self.has_secret {
            return Err(SessionError::MissingSecret);
        }

        if self.ttl_days <= 0 {
            return Err(SessionError::TtlOutOfRange(self.ttl_days));
        }
        let exp = expiry_after(issued_at, self.ttl_days).ok_or(SessionError::TtlOutOfRange(self.ttl_days))?;
        let claims = SessionClaims {
            auth_token: info.auth_token(),
            expires_at: info.expires_at.unwrap_or(exp),
            iat: unix_secs(issued_at),
            exp: unix_secs(exp),
        };

        let token =
            encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(SessionError::Creation)?;

        self.metrics.encode_total.add(1, &[]);
        Ok(token)
    }

    /// Verifies a session token.
    ///
    /// Never fails loudly: a missing, malformed, tampered or expired token is logged and
    /// reported as `None`, so callers treat every failure as "no session".
    #[must_use]
    pub fn decode(&self, token: Option<&str>) -> Option<SessionPayload> {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            tracing::debug!("No session token present");
            self.record_failure("missing");
            return None;
        };

        if !self.has_secret {
            tracing::warn!("Cannot verify session: no signing secret configured");
            self.record_failure("no_secret");
            return None;
        }

        let claims = match decode::<SessionClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => data.claims,
            Err(e) => {
                let reason = match e.kind() {
                    ErrorKind::ExpiredSignature => "expired",
                    ErrorKind::InvalidSignature => "signature",
                    ErrorKind::InvalidAlgorithm => "algorithm",
                    _ => "malformed",
                };
                tracing::warn!(error = %e, reason, "Failed to decrypt session");
                self.record_failure(reason);
                return None;
            }
        };

        let payload = match SessionPayload::try_from(claims) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, "Session issued-at is out of range");
                self.record_failure("malformed");
                return None;
            }
        };

        if payload.is_expired_at(OffsetDateTime::now_utc()) {
            tracing::debug!(expires_at = %payload.expires_at, "Session past its expiry");
            self.record_failure("expired");
            return None;
        }

        Some(payload)
    }

    fn record_failure(&self, reason: &'static str) {
        self.metrics.decode_failures_total.add(1, &[KeyValue::new("reason", reason)]);
    }
}

fn unix_secs(at: OffsetDateTime) -> u64 {
    u64::try_from(at.unix_timestamp()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn codec() -> SessionCodec {
        SessionCodec::new("test_secret", 30)
    }

    #[test]
    fn test_session_roundtrip() {
        let codec = codec();
        let expires_at = OffsetDateTime::now_utc() + Duration::days(7);
        let info = SessionInfo::new("BgFbAfdBqQ").with_expires_at(expires_at);

        let token = codec.encode(&info).unwrap();
        let payload = codec.decode(Some(&token)).unwrap();

        assert_eq!(payload.auth_token, "Bearer BgFbAfdBqQ");
        assert_eq!(payload.expires_at, expires_at);
    }

    #[test]
    fn test_default_expiry_is_ttl_from_issue() {
        let codec = codec();
        let issued_at = OffsetDateTime::now_utc().replace_nanosecond(0).unwrap();
        let token = codec.encode_at(&SessionInfo::new("abc"), issued_at).unwrap();

        let payload = codec.decode(Some(&token)).unwrap();
        assert_eq!(payload.expires_at, issued_at + Duration::days(30));
        assert_eq!(payload.issued_at, issued_at);
    }

    #[test]
    fn test_custom_token_type() {
        let codec = codec();
        let token = codec.encode(&SessionInfo::new("abc").with_token_type("Token")).unwrap();
        assert_eq!(codec.decode(Some(&token)).unwrap().auth_token, "Token abc");
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = SessionCodec::new("secret1", 30).encode(&SessionInfo::new("abc")).unwrap();
        assert!(SessionCodec::new("secret2", 30).decode(Some(&token)).is_none());
    }

    #[test]
    fn test_garbage_is_rejected() {
        let codec = codec();
        for input in ["", "not-a-jwt", "a.b.c", "eyJhbGciOiJIUzI1NiJ9.e30.", "\u{0}\u{1}"] {
            assert!(codec.decode(Some(input)).is_none(), "accepted {input:?}");
        }
        assert!(codec.decode(None).is_none());
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let codec = codec();
        let token = codec.encode(&SessionInfo::new("abc")).unwrap();
        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        let other = codec.encode(&SessionInfo::new("xyz")).unwrap();
        parts[1] = other.split('.').nth(1).unwrap().to_string();

        assert!(codec.decode(Some(&parts.join("."))).is_none());
    }

    #[test]
    fn test_expired_exp_claim_is_rejected() {
        let codec = codec();
        let issued_at = OffsetDateTime::now_utc() - Duration::days(31);
        let info = SessionInfo::new("abc").with_expires_at(OffsetDateTime::now_utc() + Duration::days(1));
        let token = codec.encode_at(&info, issued_at).unwrap();

        assert!(codec.decode(Some(&token)).is_none());
    }

    #[test]
    fn test_past_expires_at_is_rejected_despite_valid_signature() {
        let codec = codec();
        let info = SessionInfo::new("abc").with_expires_at(OffsetDateTime::now_utc() - Duration::hours(1));
        let token = codec.encode(&info).unwrap();

        assert!(codec.decode(Some(&token)).is_none());
    }

    #[test]
    fn test_missing_secret_fails_encode() {
        let codec = SessionCodec::new("", 30);
        let result = codec.encode(&SessionInfo::new("abc"));
        assert!(matches!(result, Err(SessionError::MissingSecret)));
    }

    #[test]
    fn test_out_of_range_lifetime_fails_encode() {
        for ttl_days in [0, -1, 10_000_000, i64::MAX] {
            let result = SessionCodec::new("test_secret", ttl_days).encode(&SessionInfo::new("abc"));
            assert!(matches!(result, Err(SessionError::TtlOutOfRange(d)) if d == ttl_days), "{ttl_days}");
        }
    }

    #[test]
    fn test_other_algorithm_is_rejected() {
        let claims = SessionClaims {
            auth_token: "Bearer abc".to_string(),
            expires_at: OffsetDateTime::now_utc() + Duration::days(1),
            iat: unix_secs(OffsetDateTime::now_utc()),
            exp: unix_secs(OffsetDateTime::now_utc() + Duration::days(1)),
        };
        let token =
            encode(&Header::new(Algorithm::HS512), &claims, &EncodingKey::from_secret(b"test_secret")).unwrap();

        assert!(codec().decode(Some(&token)).is_none());
    }
}
