/// Wallet service - custody wallet provisioning
use betnad_core::{
    BetnadError, IdentityProvider, Result, UserStore, Wallet, WalletProvider, WalletStore,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Provisions at most one custody wallet per user
pub struct WalletService {
    identity: Arc<dyn IdentityProvider>,
    users: Arc<dyn UserStore>,
    wallets: Arc<dyn WalletStore>,
    provider: Arc<dyn WalletProvider>,
}

impl WalletService {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        users: Arc<dyn UserStore>,
        wallets: Arc<dyn WalletStore>,
        provider: Arc<dyn WalletProvider>,
    ) -> Self {
        Self {
            identity,
            users,
            wallets,
            provider,
        }
    }

    /// Return the caller's wallet, creating it on `chain_type` if they have none.
    ///
    /// The user must have logged in before. Repeated calls return the same
    /// wallet; when two calls race, the loser returns the winner's wallet.
    pub async fn provision(&self, id_token: &str, chain_type: &str) -> Result<Wallet> {
        let decoded = self.identity.verify_id_token(id_token).await?;
        let user = self
            .users
            .find_by_subject_id(&decoded.uid)
            .await?
            .ok_or_else(|| BetnadError::user_not_found(decoded.uid.as_str()))?;

        if let Some(existing) = self.wallets.find_by_user_id(&user.uid).await? {
            if user.wallet_address.as_deref() != Some(existing.address.as_str()) {
                self.users
                    .set_wallet_address(&user.uid, &existing.address)
                    .await?;
            }
            return Ok(existing);
        }

        let provisioned = self.provider.create_wallet(chain_type).await?;

        let wallet = match self.wallets.create(provisioned.for_user(user.uid.clone())).await {
            Ok(wallet) => wallet,
            Err(BetnadError::Duplicate(_)) => {
                // A concurrent request stored its wallet first
                warn!(uid = %user.uid, "Wallet already provisioned by a concurrent request");
                self.wallets
                    .find_by_user_id(&user.uid)
                    .await?
                    .ok_or_else(|| BetnadError::storage("wallet missing after duplicate insert"))?
            }
            Err(e) => return Err(e),
        };

        self.users
            .set_wallet_address(&user.uid, &wallet.address)
            .await?;

        info!(
            uid = %user.uid,
            wallet_id = %wallet.privy_wallet_id,
            chain_type = %wallet.chain_type,
            "Custody wallet provisioned"
        );
        Ok(wallet)
    }
}
