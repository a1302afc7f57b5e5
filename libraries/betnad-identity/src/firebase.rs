//! Firebase Authentication client

use crate::access_token::AccessTokenSource;
use crate::credentials::ServiceAccount;
use crate::keys::KeyCache;
use async_trait::async_trait;
use betnad_core::{
    BetnadError, DecodedToken, IdentityProvider, ProviderUser, Result, SubjectId, TwitterIdentity,
};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Clock skew tolerated on `exp`, `iat` and `auth_time`
const CLOCK_SKEW_SECS: u64 = 60;

/// Firebase caps subject ids at 128 characters
const MAX_SUBJECT_LEN: usize = 128;

/// Provider id Firebase uses for linked Twitter accounts
const TWITTER_PROVIDER_ID: &str = "twitter.com";

/// Remote endpoints used by the adapter
#[derive(Debug, Clone)]
pub struct FirebaseEndpoints {
    /// JWKS of the keys that sign Firebase ID tokens
    pub jwks_url: String,
    /// Base URL of the Identity Toolkit REST API
    pub identity_toolkit_url: String,
}

impl Default for FirebaseEndpoints {
    fn default() -> Self {
        Self {
            jwks_url: "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com".to_string(),
            identity_toolkit_url: "https://identitytoolkit.googleapis.com".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
    iat: i64,
    exp: i64,
    auth_time: Option<i64>,
    email: Option<String>,
    email_verified: Option<bool>,
    firebase: Option<FirebaseClaim>,
}

#[derive(Debug, Deserialize)]
struct FirebaseClaim {
    sign_in_provider: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    local_id: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<AccountInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountInfo {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    photo_url: Option<String>,
    /// Milliseconds since the epoch, as a string
    created_at: Option<String>,
    last_login_at: Option<String>,
    #[serde(default)]
    provider_user_info: Vec<ProviderUserInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProviderUserInfo {
    provider_id: String,
    raw_id: Option<String>,
    screen_name: Option<String>,
}

/// Firebase Authentication adapter.
///
/// Build one per process and share it behind an `Arc`; it owns the HTTP
/// client, the signing-key cache and the service-account token cache.
pub struct FirebaseAuth {
    http: Client,
    project_id: String,
    issuer: String,
    endpoints: FirebaseEndpoints,
    keys: KeyCache,
    access_tokens: AccessTokenSource,
}

impl FirebaseAuth {
    /// Create an adapter talking to Google's production endpoints
    pub fn new(account: ServiceAccount) -> Result<Self> {
        Self::with_endpoints(account, FirebaseEndpoints::default())
    }

    /// Create an adapter with custom endpoints (emulators, tests)
    pub fn with_endpoints(account: ServiceAccount, endpoints: FirebaseEndpoints) -> Result<Self> {
        if account.project_id.is_empty() {
            return Err(BetnadError::identity_provider("project id is required"));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| BetnadError::identity_provider(e.to_string()))?;

        let access_tokens = AccessTokenSource::new(http.clone(), &account)?;
        let keys = KeyCache::new(http.clone(), endpoints.jwks_url.clone());

        Ok(Self {
            http,
            issuer: account.token_issuer(),
            project_id: account.project_id,
            endpoints,
            keys,
            access_tokens,
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.project_id.as_str()]);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iat", "aud", "iss", "sub"]);
        validation.leeway = CLOCK_SKEW_SECS;
        validation
    }
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| BetnadError::invalid_token(format!("timestamp out of range: {}", secs)))
}

/// Checks `jsonwebtoken` does not perform
fn check_claims(claims: &IdTokenClaims, now: i64) -> Result<()> {
    if claims.sub.is_empty() {
        return Err(BetnadError::invalid_token("empty subject"));
    }
    if claims.sub.len() > MAX_SUBJECT_LEN {
        return Err(BetnadError::invalid_token("subject longer than 128 characters"));
    }

    let latest = now + CLOCK_SKEW_SECS as i64;
    if claims.iat > latest {
        return Err(BetnadError::invalid_token("token issued in the future"));
    }
    if claims.auth_time.is_some_and(|auth_time| auth_time > latest) {
        return Err(BetnadError::invalid_token("authentication time in the future"));
    }

    Ok(())
}

fn parse_millis(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|ms| ms.parse::<i64>().ok())
        .and_then(DateTime::from_timestamp_millis)
}

impl From<AccountInfo> for ProviderUser {
    fn from(account: AccountInfo) -> Self {
        let created_at = parse_millis(account.created_at.as_deref()).unwrap_or_else(|| {
            warn!(uid = %account.local_id, "Account record has no creation time");
            Utc::now()
        });

        let twitter = account
            .provider_user_info
            .into_iter()
            .find(|info| info.provider_id == TWITTER_PROVIDER_ID)
            .and_then(|info| {
                info.raw_id.map(|id| TwitterIdentity {
                    id,
                    username: info.screen_name,
                })
            });

        Self {
            uid: SubjectId::new(account.local_id),
            email: account.email,
            display_name: account.display_name,
            photo_url: account.photo_url,
            twitter,
            created_at,
            last_sign_in_at: parse_millis(account.last_login_at.as_deref()),
        }
    }
}

#[async_trait]
impl IdentityProvider for FirebaseAuth {
    async fn verify_id_token(&self, token: &str) -> Result<DecodedToken> {
        let header = decode_header(token)
            .map_err(|e| BetnadError::invalid_token(format!("malformed token: {}", e)))?;

        if header.alg != Algorithm::RS256 {
            return Err(BetnadError::invalid_token(format!(
                "unexpected algorithm {:?}",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| BetnadError::invalid_token("token has no key id"))?;
        let key = self.keys.key_for(&kid).await?;

        let claims = decode::<IdTokenClaims>(token, &key, &self.validation())
            .map_err(|e| BetnadError::invalid_token(e.to_string()))?
            .claims;

        check_claims(&claims, Utc::now().timestamp())?;

        debug!(uid = %claims.sub, "ID token verified");

        Ok(DecodedToken {
            uid: SubjectId::new(claims.sub),
            email: claims.email,
            email_verified: claims.email_verified,
            sign_in_provider: claims.firebase.and_then(|f| f.sign_in_provider),
            auth_time: claims.auth_time.map(timestamp).transpose()?,
            issued_at: timestamp(claims.iat)?,
            expires_at: timestamp(claims.exp)?,
        })
    }

    async fn get_user(&self, uid: &SubjectId) -> Result<ProviderUser> {
        let url = format!(
            "{}/v1/projects/{}/accounts:lookup",
            self.endpoints.identity_toolkit_url.trim_end_matches('/'),
            self.project_id
        );
        let access_token = self.access_tokens.token().await?;

        debug!(uid = %uid, "Looking up provider user record");

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(&LookupRequest {
                local_id: [uid.as_str()],
            })
            .send()
            .await
            .map_err(|e| BetnadError::identity_provider(format!("user lookup failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(uid = %uid, status = %status, "User lookup rejected");
            return Err(BetnadError::identity_provider(format!(
                "user lookup returned {}: {}",
                status, body
            )));
        }

        let lookup: LookupResponse = response.json().await.map_err(|e| {
            BetnadError::identity_provider(format!("invalid lookup response: {}", e))
        })?;

        lookup
            .users
            .into_iter()
            .find(|account| account.local_id == uid.as_str())
            .map(ProviderUser::from)
            .ok_or_else(|| BetnadError::user_not_found(uid.as_str()))
    }
}
