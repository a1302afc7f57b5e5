//! Cache of the provider's public signing keys (JWKS)

use betnad_core::{BetnadError, Result};
use jsonwebtoken::{jwk::JwkSet, DecodingKey};
use reqwest::{header::CACHE_CONTROL, Client};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Used when the key endpoint sends no usable `Cache-Control: max-age`
const DEFAULT_KEY_TTL: Duration = Duration::from_secs(60 * 60);

struct CachedKeys {
    keys: JwkSet,
    expires_at: Instant,
}

/// Signing keys fetched from a JWKS endpoint and kept until they expire
pub(crate) struct KeyCache {
    http: Client,
    url: String,
    cached: RwLock<Option<CachedKeys>>,
}

impl KeyCache {
    pub(crate) fn new(http: Client, url: String) -> Self {
        Self {
            http,
            url,
            cached: RwLock::new(None),
        }
    }

    /// Decoding key for a key id, refreshing the set once it has expired
    pub(crate) async fn key_for(&self, kid: &str) -> Result<DecodingKey> {
        {
            let cached = self.cached.read().await;
            if let Some(cached) = cached.as_ref().filter(|c| c.expires_at > Instant::now()) {
                return lookup(&cached.keys, kid);
            }
        }

        let mut cached = self.cached.write().await;
        // Another request may have refreshed while we waited for the lock
        if let Some(fresh) = cached.as_ref().filter(|c| c.expires_at > Instant::now()) {
            return lookup(&fresh.keys, kid);
        }

        let fetched = self.fetch().await?;
        let key = lookup(&fetched.keys, kid);
        *cached = Some(fetched);
        key
    }

    async fn fetch(&self) -> Result<CachedKeys> {
        debug!(url = %self.url, "Fetching identity provider signing keys");

        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| BetnadError::identity_provider(format!("key fetch failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BetnadError::identity_provider(format!(
                "key endpoint returned {}",
                status
            )));
        }

        let ttl = response
            .headers()
            .get(CACHE_CONTROL)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_max_age)
            .unwrap_or(DEFAULT_KEY_TTL);

        let keys: JwkSet = response
            .json()
            .await
            .map_err(|e| BetnadError::identity_provider(format!("invalid key set: {}", e)))?;

        debug!(count = keys.keys.len(), ttl_secs = ttl.as_secs(), "Signing keys cached");

        Ok(CachedKeys {
            keys,
            expires_at: Instant::now() + ttl,
        })
    }
}

fn lookup(keys: &JwkSet, kid: &str) -> Result<DecodingKey> {
    let jwk = keys
        .find(kid)
        .ok_or_else(|| BetnadError::invalid_token(format!("no signing key with id {}", kid)))?;

    DecodingKey::from_jwk(jwk)
        .map_err(|e| BetnadError::identity_provider(format!("unusable signing key: {}", e)))
}

/// `max-age` directive of a `Cache-Control` header
fn parse_max_age(header: &str) -> Option<Duration> {
    header
        .split(',')
        .filter_map(|directive| directive.trim().strip_prefix("max-age="))
        .find_map(|secs| secs.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
