//! Privy REST client.

use crate::error::{PrivyError, Result};
use crate::types::{CreateWalletRequest, PrivyWallet};
use async_trait::async_trait;
use betnad_core::{ProvisionedWallet, WalletProvider};
use reqwest::{Client, Response};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Production Privy API
pub const DEFAULT_BASE_URL: &str = "https://api.privy.io";

const APP_ID_HEADER: &str = "privy-app-id";

/// Client for Privy's server wallet API.
///
/// Requests authenticate with HTTP basic auth (`app_id:app_secret`) and carry
/// the app id in the `privy-app-id` header.
#[derive(Clone)]
pub struct PrivyClient {
    http: Client,
    base_url: String,
    app_id: String,
    app_secret: String,
}

impl PrivyClient {
    /// Create a client for the production API.
    pub fn new(app_id: impl Into<String>, app_secret: impl Into<String>) -> Result<Self> {
        Self::with_base_url(app_id, app_secret, DEFAULT_BASE_URL)
    }

    /// Create a client for a custom base URL.
    pub fn with_base_url(
        app_id: impl Into<String>,
        app_secret: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        let app_id = app_id.into();
        let app_secret = app_secret.into();
        let base_url = base_url.into().trim_end_matches('/').to_string();

        if app_id.is_empty() || app_secret.is_empty() {
            return Err(PrivyError::InvalidConfig(
                "app id and app secret are required".into(),
            ));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(PrivyError::InvalidConfig(
                "base URL must start with http:// or https://".into(),
            ));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("BetNad/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            app_id,
            app_secret,
        })
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Create a new server wallet on `chain_type`.
    pub async fn create_wallet(&self, chain_type: &str) -> Result<PrivyWallet> {
        let url = format!("{}/v1/wallets", self.base_url);
        debug!(chain_type = %chain_type, "Creating Privy wallet");

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.app_id, Some(&self.app_secret))
            .header(APP_ID_HEADER, &self.app_id)
            .json(&CreateWalletRequest { chain_type })
            .send()
            .await?;

        let wallet: PrivyWallet = parse(response).await?;
        info!(wallet_id = %wallet.id, chain_type = %wallet.chain_type, "Privy wallet created");
        Ok(wallet)
    }

    /// Fetch a wallet by its Privy id.
    pub async fn get_wallet(&self, wallet_id: &str) -> Result<PrivyWallet> {
        let url = format!("{}/v1/wallets/{}", self.base_url, wallet_id);
        debug!(wallet_id = %wallet_id, "Fetching Privy wallet");

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.app_id, Some(&self.app_secret))
            .header(APP_ID_HEADER, &self.app_id)
            .send()
            .await?;

        parse(response).await
    }
}

async fn parse(response: Response) -> Result<PrivyWallet> {
    let status = response.status();

    if status.is_success() {
        response
            .json()
            .await
            .map_err(|e| PrivyError::Parse(format!("Failed to parse wallet: {}", e)))
    } else {
        let message = response.text().await.unwrap_or_default();
        warn!(status = %status, "Privy request failed");
        Err(PrivyError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

impl fmt::Debug for PrivyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivyClient")
            .field("base_url", &self.base_url)
            .field("app_id", &self.app_id)
            .field("app_secret", &"<redacted>")
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl WalletProvider for PrivyClient {
    async fn create_wallet(&self, chain_type: &str) -> betnad_core::Result<ProvisionedWallet> {
        let wallet = PrivyClient::create_wallet(self, chain_type).await?;
        Ok(wallet.into())
    }
}
