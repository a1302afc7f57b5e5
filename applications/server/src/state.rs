/// Shared application state
use crate::services::{AuthService, WalletService};
use betnad_core::{IdentityProvider, UserStore, WalletProvider, WalletStore};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub wallet_service: Arc<WalletService>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserStore>,
        wallets: Arc<dyn WalletStore>,
        identity: Arc<dyn IdentityProvider>,
        wallet_provider: Arc<dyn WalletProvider>,
    ) -> Self {
        let auth_service = AuthService::new(Arc::clone(&identity), Arc::clone(&users));
        let wallet_service = WalletService::new(identity, users, wallets, wallet_provider);

        Self {
            auth_service: Arc::new(auth_service),
            wallet_service: Arc::new(wallet_service),
        }
    }
}
