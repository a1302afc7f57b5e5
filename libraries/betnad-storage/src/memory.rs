//! In-process storage with the same semantics as the MongoDB models

use async_trait::async_trait;
use betnad_core::{
    error::{BetnadError, Result},
    traits::{UserStore, WalletStore},
    types::*,
};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Storage kept in memory, for tests and local runs without MongoDB.
///
/// Every write takes the map's write lock, so upserts are atomic per process.
#[derive(Default)]
pub struct InMemoryStorage {
    users: RwLock<HashMap<SubjectId, User>>,
    wallets: RwLock<HashMap<SubjectId, Wallet>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn wallet_count(&self) -> usize {
        self.wallets.read().await.len()
    }
}

/// Next `updated_at` for a record: now, but always after the previous value
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::milliseconds(1)
    }
}

fn merge_optional(target: &mut Option<String>, incoming: Option<String>) {
    if incoming.is_some() {
        *target = incoming;
    }
}

#[async_trait]
impl UserStore for InMemoryStorage {
    async fn find_by_subject_id(&self, uid: &SubjectId) -> Result<Option<User>> {
        Ok(self.users.read().await.get(uid).cloned())
    }

    async fn create_or_update(&self, user: User) -> Result<User> {
        let mut users = self.users.write().await;

        let stored = match users.get_mut(&user.uid) {
            Some(existing) => {
                existing.email = user.email;
                merge_optional(&mut existing.display_name, user.display_name);
                merge_optional(&mut existing.photo_url, user.photo_url);
                merge_optional(&mut existing.wallet_address, user.wallet_address);
                merge_optional(&mut existing.twitter_id, user.twitter_id);
                merge_optional(&mut existing.twitter_username, user.twitter_username);
                merge_optional(&mut existing.twitter_access_token, user.twitter_access_token);
                merge_optional(&mut existing.twitter_refresh_token, user.twitter_refresh_token);
                if user.twitter_token_expires_at.is_some() {
                    existing.twitter_token_expires_at = user.twitter_token_expires_at;
                }
                existing.updated_at = next_timestamp(existing.updated_at);
                existing.clone()
            }
            None => {
                let mut inserted = user;
                inserted.updated_at = Utc::now();
                users.insert(inserted.uid.clone(), inserted.clone());
                inserted
            }
        };

        Ok(stored)
    }

    async fn set_wallet_address(&self, uid: &SubjectId, address: &str) -> Result<Option<User>> {
        let mut users = self.users.write().await;

        Ok(users.get_mut(uid).map(|user| {
            user.wallet_address = Some(address.to_string());
            user.updated_at = next_timestamp(user.updated_at);
            user.clone()
        }))
    }

    async fn delete(&self, uid: &SubjectId) -> Result<bool> {
        Ok(self.users.write().await.remove(uid).is_some())
    }
}

#[async_trait]
impl WalletStore for InMemoryStorage {
    async fn find_by_user_id(&self, user_id: &SubjectId) -> Result<Option<Wallet>> {
        Ok(self.wallets.read().await.get(user_id).cloned())
    }

    async fn create(&self, wallet: NewWallet) -> Result<Wallet> {
        let mut wallets = self.wallets.write().await;

        if wallets.contains_key(&wallet.user_id) {
            return Err(BetnadError::Duplicate(format!(
                "wallet already exists for user {}",
                wallet.user_id
            )));
        }

        let now = Utc::now();
        let created = Wallet {
            user_id: wallet.user_id,
            privy_wallet_id: wallet.privy_wallet_id,
            address: wallet.address,
            chain_type: wallet.chain_type,
            created_at: now,
            updated_at: now,
        };
        wallets.insert(created.user_id.clone(), created.clone());

        Ok(created)
    }

    async fn update(&self, user_id: &SubjectId, update: WalletUpdate) -> Result<Option<Wallet>> {
        let mut wallets = self.wallets.write().await;

        Ok(wallets.get_mut(user_id).map(|wallet| {
            if let Some(privy_wallet_id) = update.privy_wallet_id {
                wallet.privy_wallet_id = privy_wallet_id;
            }
            if let Some(address) = update.address {
                wallet.address = address;
            }
            if let Some(chain_type) = update.chain_type {
                wallet.chain_type = chain_type;
            }
            wallet.updated_at = next_timestamp(wallet.updated_at);
            wallet.clone()
        }))
    }

    async fn delete(&self, user_id: &SubjectId) -> Result<bool> {
        Ok(self.wallets.write().await.remove(user_id).is_some())
    }
}
