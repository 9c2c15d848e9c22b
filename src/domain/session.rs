use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";

const SECONDS_PER_DAY: i64 = 86_400;

/// `from` plus `ttl_days`, or `None` if the result falls outside the representable range.
#[must_use]
pub fn expiry_after(from: OffsetDateTime, ttl_days: i64) -> Option<OffsetDateTime> {
    ttl_days.checked_mul(SECONDS_PER_DAY).and_then(|secs| from.checked_add(Duration::seconds(secs)))
}

/// Credential handed to the session codec at sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub access_token: String,
    pub token_type: String,
    /// Absolute expiry of the session; defaults to the codec's lifetime when `None`.
    pub expires_at: Option<OffsetDateTime>,
}

impl SessionInfo {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self { access_token: access_token.into(), token_type: DEFAULT_TOKEN_TYPE.to_string(), expires_at: None }
    }

    #[must_use]
    pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
        self.token_type = token_type.into();
        self
    }

    #[must_use]
    pub const fn with_expires_at(mut self, expires_at: OffsetDateTime) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// The value sent as the `Authorization` header, e.g. `Bearer abc`.
    #[must_use]
    pub fn auth_token(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

/// Signed claims carried by the session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    pub auth_token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    pub iat: u64,
    pub exp: u64,
}

/// A verified session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPayload {
    pub auth_token: String,
    pub expires_at: OffsetDateTime,
    pub issued_at: OffsetDateTime,
}

impl SessionPayload {
    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }
}

impl TryFrom<SessionClaims> for SessionPayload {
    type Error = time::error::ComponentRange;

    fn try_from(claims: SessionClaims) -> Result<Self, Self::Error> {
        let issued_at = OffsetDateTime::from_unix_timestamp(i64::try_from(claims.iat).unwrap_or(i64::MAX))?;
        Ok(Self { auth_token: claims.auth_token, expires_at: claims.expires_at, issued_at })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_token_joins_type_and_token() {
        let info = SessionInfo::new("BgFbAfdBqQ");
        assert_eq!(info.auth_token(), "Bearer BgFbAfdBqQ");

        let info = info.with_token_type("Token");
        assert_eq!(info.auth_token(), "Token BgFbAfdBqQ");
    }

    #[test]
    fn test_claims_use_camel_case_on_the_wire() {
        let claims = SessionClaims {
            auth_token: "Bearer abc".to_string(),
            expires_at: OffsetDateTime::UNIX_EPOCH,
            iat: 1,
            exp: 2,
        };

        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["authToken"], "Bearer abc");
        assert_eq!(json["expiresAt"], "1970-01-01T00:00:00Z");
    }
}
