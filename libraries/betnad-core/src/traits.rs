//! Seams between the HTTP layer and the outside world
//!
//! The server holds these as `Arc<dyn Trait>` so that MongoDB, Firebase and
//! Privy can be swapped for in-process implementations.

use crate::error::Result;
use crate::types::{
    DecodedToken, NewWallet, ProviderUser, ProvisionedWallet, SubjectId, User, Wallet,
    WalletUpdate,
};
use async_trait::async_trait;

/// Persistence of `User` records
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a user by subject id
    async fn find_by_subject_id(&self, uid: &SubjectId) -> Result<Option<User>>;

    /// Insert the user or update the existing record with the same `uid`.
    ///
    /// Must be a single atomic operation: concurrent calls for one `uid` never
    /// leave two records. `created_at` of an existing record is preserved and
    /// `updated_at` is set to the time of the write. Fields that are `None` on
    /// `user` are left as stored.
    async fn create_or_update(&self, user: User) -> Result<User>;

    /// Record the custody wallet address on an existing user
    async fn set_wallet_address(&self, uid: &SubjectId, address: &str) -> Result<Option<User>>;

    /// Delete a user; returns whether a record was removed
    async fn delete(&self, uid: &SubjectId) -> Result<bool>;
}

/// Persistence of custody `Wallet` records (one per user)
#[async_trait]
pub trait WalletStore: Send + Sync {
    async fn find_by_user_id(&self, user_id: &SubjectId) -> Result<Option<Wallet>>;

    /// Persist a new wallet. Fails with `Duplicate` if the user already has one.
    async fn create(&self, wallet: NewWallet) -> Result<Wallet>;

    /// Apply a partial update; returns the updated wallet or `None` if absent
    async fn update(&self, user_id: &SubjectId, update: WalletUpdate) -> Result<Option<Wallet>>;

    async fn delete(&self, user_id: &SubjectId) -> Result<bool>;
}

/// Identity provider (ID-token verification and user lookup)
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify an ID token and return its claims.
    ///
    /// Fails with `InvalidToken` for malformed, expired or forged tokens.
    async fn verify_id_token(&self, token: &str) -> Result<DecodedToken>;

    /// Fetch the provider's record for a subject. Fails with `UserNotFound`.
    async fn get_user(&self, uid: &SubjectId) -> Result<ProviderUser>;
}

/// Wallet custody provider
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Create a new custody wallet on the given chain
    async fn create_wallet(&self, chain_type: &str) -> Result<ProvisionedWallet>;
}
