//! Access-token lifecycle and authorization

use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};

use crate::core::errors::{ApiError, Result};

/// Milliseconds subtracted from server-declared lifetimes so callers
/// refresh before the server actually expires the token
pub const REFRESH_MARGIN_MS: i64 = 1500;

/// Token payload returned by the authentication endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationData {
    pub access_token: String,
    pub refresh_token: String,
    /// Access-token lifetime in seconds
    pub expires_in: i64,
    /// Refresh-token lifetime in seconds
    pub refresh_expires_in: i64,
    pub token_type: String,
    #[serde(default)]
    pub session_state: String,
}

/// Credential snapshot for authenticated calls
///
/// Immutable once created. Refreshing produces a whole new context which the
/// caller swaps in atomically; in-flight calls holding the old snapshot are
/// unaffected. Validity is checked against a caller-supplied clock in epoch
/// milliseconds; there is no background refresh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenContext {
    access_token: String,
    token_type: String,
    /// When the token response was parsed, epoch millis
    issued_at: i64,
    expires_in: i64,
    refresh_expires_in: i64,
    refresh_token: String,
    session_state: String,
}

impl TokenContext {
    /// Build a context from an authentication payload parsed at `issued_at`
    /// (epoch millis)
    pub fn from_data(data: AuthenticationData, issued_at: i64) -> Self {
        Self {
            access_token: data.access_token,
            token_type: data.token_type,
            issued_at,
            expires_in: data.expires_in,
            refresh_expires_in: data.refresh_expires_in,
            refresh_token: data.refresh_token,
            session_state: data.session_state,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    pub fn session_state(&self) -> &str {
        &self.session_state
    }

    pub fn issued_at(&self) -> i64 {
        self.issued_at
    }

    /// Instant (epoch millis) after which the access token should no longer
    /// be used
    pub fn access_token_expiry(&self) -> i64 {
        self.issued_at + self.expires_in * 1000 - REFRESH_MARGIN_MS
    }

    /// Instant (epoch millis) after which the refresh token should no longer
    /// be used
    pub fn refresh_token_expiry(&self) -> i64 {
        self.issued_at + self.refresh_expires_in * 1000 - REFRESH_MARGIN_MS
    }

    /// Check whether the access token is still usable at `now` (epoch millis)
    pub fn is_access_token_valid(&self, now: i64) -> bool {
        now < self.access_token_expiry()
    }

    /// Check whether the refresh token is still usable at `now` (epoch millis)
    pub fn is_refresh_token_valid(&self, now: i64) -> bool {
        now < self.refresh_token_expiry()
    }

    /// Authorization header value, `"<tokenType> <accessToken>"`
    pub fn authorization_header_value(&self) -> Result<String> {
        if self.access_token.is_empty() {
            return Err(ApiError::MissingCredential);
        }

        Ok(format!("{} {}", self.token_type, self.access_token))
    }

    /// Attach the Authorization header to an outgoing request
    pub fn apply_to(&self, request: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder> {
        Ok(request.header(AUTHORIZATION, self.authorization_header_value()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(issued_at: i64, expires_in: i64, refresh_expires_in: i64) -> TokenContext {
        TokenContext::from_data(
            AuthenticationData {
                access_token: "access".to_string(),
                refresh_token: "refresh".to_string(),
                expires_in,
                refresh_expires_in,
                token_type: "Bearer".to_string(),
                session_state: "session".to_string(),
            },
            issued_at,
        )
    }

    #[test]
    fn test_access_token_expiry_math() {
        let ctx = context(1_000_000, 480, 3600);
        assert_eq!(ctx.access_token_expiry(), 1_000_000 + 480 * 1000 - 1500);
        assert_eq!(ctx.refresh_token_expiry(), 1_000_000 + 3600 * 1000 - 1500);
    }

    #[test]
    fn test_access_token_validity_boundary() {
        let ctx = context(1_000_000, 480, 3600);
        let expiry = ctx.access_token_expiry();

        assert!(ctx.is_access_token_valid(expiry - 1));
        assert!(!ctx.is_access_token_valid(expiry));
        assert!(!ctx.is_access_token_valid(expiry + 1));
    }

    #[test]
    fn test_refresh_token_validity_boundary() {
        let ctx = context(0, 480, 3600);
        let expiry = ctx.refresh_token_expiry();

        assert!(ctx.is_refresh_token_valid(expiry - 1));
        assert!(!ctx.is_refresh_token_valid(expiry));
    }

    #[test]
    fn test_authorization_header_value() {
        let ctx = context(0, 480, 3600);
        assert_eq!(ctx.authorization_header_value().unwrap(), "Bearer access");
    }

    #[test]
    fn test_authorization_header_missing_token() {
        let ctx = TokenContext::from_data(
            AuthenticationData {
                access_token: String::new(),
                refresh_token: "refresh".to_string(),
                expires_in: 480,
                refresh_expires_in: 3600,
                token_type: "Bearer".to_string(),
                session_state: String::new(),
            },
            0,
        );

        assert!(matches!(
            ctx.authorization_header_value(),
            Err(ApiError::MissingCredential)
        ));
    }

    #[test]
    fn test_authentication_data_wire_shape() {
        let json = r#"{
            "accessToken": "access",
            "refreshToken": "refresh",
            "expiresIn": 480,
            "refreshExpiresIn": 3660,
            "tokenType": "Bearer",
            "sessionState": "abc"
        }"#;

        let data: AuthenticationData = serde_json::from_str(json).unwrap();
        assert_eq!(data.access_token, "access");
        assert_eq!(data.expires_in, 480);
        assert_eq!(data.token_type, "Bearer");
    }
}
