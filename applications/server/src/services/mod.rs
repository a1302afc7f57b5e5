/// Server services
pub mod auth;
pub mod wallets;

pub use auth::AuthService;
pub use wallets::WalletService;
