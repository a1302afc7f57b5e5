/// Custody wallet domain types
use super::SubjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Chain used when a provisioning request does not name one
pub const DEFAULT_CHAIN_TYPE: &str = "ethereum";

/// Custody wallet owned by a user (one per user)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub user_id: SubjectId,
    /// Wallet id at the custody provider
    pub privy_wallet_id: String,
    pub address: String,
    /// Chain tag as reported by the provider (`ethereum`, `solana`, ...)
    pub chain_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to persist a new wallet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWallet {
    pub user_id: SubjectId,
    pub privy_wallet_id: String,
    pub address: String,
    pub chain_type: String,
}

/// Partial wallet update; `None` leaves the field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletUpdate {
    pub privy_wallet_id: Option<String>,
    pub address: Option<String>,
    pub chain_type: Option<String>,
}

impl WalletUpdate {
    pub fn is_empty(&self) -> bool {
        self.privy_wallet_id.is_none() && self.address.is_none() && self.chain_type.is_none()
    }
}

/// Wallet as created by the custody provider, before it is linked to a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionedWallet {
    pub id: String,
    pub address: String,
    pub chain_type: String,
}

impl ProvisionedWallet {
    /// Link the provider wallet to its owner
    pub fn for_user(self, user_id: SubjectId) -> NewWallet {
        NewWallet {
            user_id,
            privy_wallet_id: self.id,
            address: self.address,
            chain_type: self.chain_type,
        }
    }
}
