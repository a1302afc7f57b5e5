/// Wallet API routes
use crate::api::auth::ErrorResponse;
use crate::api::extract::{require_id_token, Validate, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use betnad_core::{types::DEFAULT_CHAIN_TYPE, Wallet};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionWalletRequest {
    pub id_token: String,
    pub chain_type: Option<String>,
}

impl Validate for ProvisionWalletRequest {
    fn validate(&self) -> Result<(), String> {
        require_id_token(&self.id_token)?;
        if self.chain_type.as_deref().is_some_and(|chain| chain.trim().is_empty()) {
            return Err("Chain type must not be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletResponse {
    pub address: String,
    pub chain_type: String,
    pub privy_wallet_id: String,
    pub created_at: DateTime<Utc>,
}

impl From<Wallet> for WalletResponse {
    fn from(wallet: Wallet) -> Self {
        Self {
            address: wallet.address,
            chain_type: wallet.chain_type,
            privy_wallet_id: wallet.privy_wallet_id,
            created_at: wallet.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProvisionWalletResponse {
    pub success: bool,
    pub wallet: WalletResponse,
    pub message: &'static str,
}

/// POST /api/wallets
pub async fn provision_wallet(
    State(app_state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ProvisionWalletRequest>,
) -> impl IntoResponse {
    let chain_type = req.chain_type.as_deref().unwrap_or(DEFAULT_CHAIN_TYPE);

    match app_state
        .wallet_service
        .provision(&req.id_token, chain_type)
        .await
    {
        Ok(wallet) => (
            StatusCode::OK,
            Json(ProvisionWalletResponse {
                success: true,
                wallet: wallet.into(),
                message: "Wallet ready",
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Wallet provisioning failed");
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    success: false,
                    error: "WALLET_PROVISION_FAILED",
                    message: e.client_message().to_string(),
                }),
            )
                .into_response()
        }
    }
}
