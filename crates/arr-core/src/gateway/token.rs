//! OAuth2 access tokens for a service account.
//!
//! Google's server-to-server flow: sign a short-lived RS256 JWT with the
//! service account's private key, post it to the token endpoint as a
//! `jwt-bearer` grant, and receive a bearer token valid for about an hour.

use std::sync::Mutex;
use std::time::Duration;

use arr_common::{Error, Result, ServiceAccount};
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use super::wire;

/// Scopes requested for the access token.
pub const SCOPES: &str = "https://www.googleapis.com/auth/cloud-platform \
https://www.googleapis.com/auth/identitytoolkit \
https://www.googleapis.com/auth/datastore";

const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime of the signed assertion; Google rejects anything above an hour.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens are refreshed this long before they expire.
pub const REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// Token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// A bearer token and when it stops being valid.
#[derive(Clone)]
pub struct AccessToken {
    access_token: String,
    token_type: String,
    expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

impl AccessToken {
    pub fn from_response(response: TokenResponse, now: DateTime<Utc>) -> Self {
        let lifetime = response.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS as u64);
        Self {
            access_token: response.access_token,
            token_type: response.token_type,
            expires_at: now + chrono::Duration::seconds(lifetime as i64),
        }
    }

    /// Whether the token is within `margin` of expiry at `now`.
    pub fn needs_refresh_at(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        chrono::Duration::from_std(margin)
            .ok()
            .and_then(|margin| now.checked_add_signed(margin))
            .map_or(true, |deadline| deadline >= self.expires_at)
    }

    /// Value for the `Authorization` header.
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

/// Build the signed JWT assertion for `account`.
pub fn sign_assertion(account: &ServiceAccount, now: DateTime<Utc>) -> Result<String> {
    let key = EncodingKey::from_rsa_pem(account.private_key.as_bytes())
        .map_err(|e| Error::Token(format!("invalid private key: {e}")))?;

    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(account.private_key_id.clone());

    let iat = now.timestamp();
    let claims = Claims {
        iss: &account.client_email,
        scope: SCOPES,
        aud: &account.token_uri,
        iat,
        exp: iat + ASSERTION_LIFETIME_SECS,
    };

    encode(&header, &claims, &key).map_err(|e| Error::Token(format!("signing failed: {e}")))
}

/// Caching token source.
pub struct TokenSource {
    account: ServiceAccount,
    agent: ureq::Agent,
    cached: Mutex<Option<AccessToken>>,
}

impl TokenSource {
    pub fn new(account: ServiceAccount, agent: ureq::Agent) -> Self {
        Self {
            account,
            agent,
            cached: Mutex::new(None),
        }
    }

    /// Current `Authorization` header value, exchanging a new token when the
    /// cached one is missing or about to expire.
    pub fn authorization(&self) -> Result<String> {
        let mut cached = self
            .cached
            .lock()
            .map_err(|_| Error::Token("token cache poisoned".to_string()))?;

        let now = Utc::now();
        if let Some(token) = cached.as_ref() {
            if !token.needs_refresh_at(now, REFRESH_MARGIN) {
                return Ok(token.authorization_header());
            }
        }

        let token = self.exchange(now)?;
        let header = token.authorization_header();
        *cached = Some(token);
        Ok(header)
    }

    /// Drop the cached token.
    pub fn clear(&self) {
        if let Ok(mut cached) = self.cached.lock() {
            *cached = None;
        }
    }

    fn exchange(&self, now: DateTime<Utc>) -> Result<AccessToken> {
        let assertion = sign_assertion(&self.account, now)?;
        tracing::debug!(
            target: "gateway.token",
            client_email = %self.account.client_email,
            token_uri = %self.account.token_uri,
            "exchanging assertion for access token"
        );

        let response = self
            .agent
            .post(&self.account.token_uri)
            .send_form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
            .map_err(|e| wire::http_error(e, Error::Token))?;

        let body: TokenResponse = response
            .into_json()
            .map_err(|e| Error::Token(format!("malformed token response: {e}")))?;
        let token = AccessToken::from_response(body, now);

        tracing::info!(
            target: "gateway.token",
            expires_at = %token.expires_at,
            "access token acquired"
        );
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::decode_header;

    const TEST_KEY: &str = include_str!("../../tests/fixtures/test-key.pem");

    fn account() -> ServiceAccount {
        ServiceAccount {
            project_id: "demo".into(),
            private_key_id: "kid-1".into(),
            private_key: TEST_KEY.into(),
            client_email: "svc@demo.iam.gserviceaccount.com".into(),
            token_uri: "https://oauth2.googleapis.com/token".into(),
        }
    }

    #[test]
    fn test_sign_assertion_sets_rs256_and_kid() {
        let jwt = sign_assertion(&account(), Utc::now()).unwrap();
        let header = decode_header(&jwt).unwrap();
        assert_eq!(header.alg, Algorithm::RS256);
        assert_eq!(header.kid.as_deref(), Some("kid-1"));
        assert_eq!(jwt.split('.').count(), 3);
    }

    #[test]
    fn test_sign_assertion_rejects_bad_key() {
        let mut account = account();
        account.private_key = "not a key".into();
        let err = sign_assertion(&account, Utc::now()).unwrap_err();
        assert_eq!(err.code(), 21);
        assert!(err.to_string().contains("invalid private key"));
    }

    #[test]
    fn test_access_token_refresh_window() {
        let now = Utc::now();
        let token = AccessToken::from_response(
            TokenResponse {
                access_token: "ya29.x".into(),
                token_type: "Bearer".into(),
                expires_in: Some(3599),
            },
            now,
        );

        assert!(!token.needs_refresh_at(now, REFRESH_MARGIN));
        assert!(token.needs_refresh_at(now + chrono::Duration::seconds(3540), REFRESH_MARGIN));
        assert_eq!(token.authorization_header(), "Bearer ya29.x");
    }

    #[test]
    fn test_token_response_defaults() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"abc"}"#).unwrap();
        assert_eq!(response.token_type, "Bearer");
        assert!(response.expires_in.is_none());
    }

    #[test]
    fn test_debug_hides_token() {
        let token = AccessToken::from_response(
            TokenResponse {
                access_token: "secret-value".into(),
                token_type: "Bearer".into(),
                expires_in: None,
            },
            Utc::now(),
        );
        assert!(!format!("{token:?}").contains("secret-value"));
    }
}
