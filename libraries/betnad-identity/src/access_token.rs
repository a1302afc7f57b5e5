//! OAuth2 access tokens for the service account (JWT bearer grant)

use crate::credentials::ServiceAccount;
use betnad_core::{BetnadError, Result};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

const SCOPES: &str = "https://www.googleapis.com/auth/cloud-platform \
                      https://www.googleapis.com/auth/firebase \
                      https://www.googleapis.com/auth/identitytoolkit \
                      https://www.googleapis.com/auth/userinfo.email";

/// Lifetime requested for the signed assertion
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens are renewed this long before the provider says they expire
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// Issues and caches access tokens for one service account
pub(crate) struct AccessTokenSource {
    http: Client,
    client_email: String,
    key_id: String,
    token_uri: String,
    signing_key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl AccessTokenSource {
    pub(crate) fn new(http: Client, account: &ServiceAccount) -> Result<Self> {
        let signing_key = EncodingKey::from_rsa_pem(account.private_key_pem().as_bytes())
            .map_err(|e| {
                BetnadError::identity_provider(format!("invalid service account key: {}", e))
            })?;

        Ok(Self {
            http,
            client_email: account.client_email.clone(),
            key_id: account.private_key_id.clone(),
            token_uri: account.token_uri().to_string(),
            signing_key,
            cached: Mutex::new(None),
        })
    }

    /// A valid access token, fetching a new one when the cached one is about to expire
    pub(crate) async fn token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref().filter(|t| t.refresh_at > Instant::now()) {
            return Ok(token.value.clone());
        }

        let fresh = self.fetch().await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }

    fn assertion(&self) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: SCOPES,
            aud: &self.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        if !self.key_id.is_empty() {
            header.kid = Some(self.key_id.clone());
        }

        encode(&header, &claims, &self.signing_key)
            .map_err(|e| BetnadError::identity_provider(format!("assertion signing failed: {}", e)))
    }

    async fn fetch(&self) -> Result<CachedToken> {
        debug!(token_uri = %self.token_uri, "Requesting service account access token");

        let assertion = self.assertion()?;
        let response = self
            .http
            .post(&self.token_uri)
            .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| BetnadError::identity_provider(format!("token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BetnadError::identity_provider(format!(
                "token endpoint returned {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            BetnadError::identity_provider(format!("invalid token response: {}", e))
        })?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(EXPIRY_MARGIN);

        Ok(CachedToken {
            value: token.access_token,
            refresh_at: Instant::now() + lifetime,
        })
    }
}
