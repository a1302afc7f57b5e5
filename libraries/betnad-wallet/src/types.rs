//! Privy API payloads

use betnad_core::ProvisionedWallet;
use serde::{Deserialize, Serialize};

/// Body of `POST /v1/wallets`
#[derive(Debug, Serialize)]
pub(crate) struct CreateWalletRequest<'a> {
    pub chain_type: &'a str,
}

/// Wallet object returned by the Privy API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PrivyWallet {
    pub id: String,
    pub address: String,
    pub chain_type: String,
    /// Milliseconds since the epoch
    #[serde(default)]
    pub created_at: Option<i64>,
}

impl From<PrivyWallet> for ProvisionedWallet {
    fn from(wallet: PrivyWallet) -> Self {
        Self {
            id: wallet.id,
            address: wallet.address,
            chain_type: wallet.chain_type,
        }
    }
}
