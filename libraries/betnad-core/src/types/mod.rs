/// Core domain types for BetNad
mod identity;
mod ids;
mod user;
mod wallet;

pub use identity::{DecodedToken, ProviderUser, TwitterIdentity};
pub use ids::SubjectId;
pub use user::User;
pub use wallet::{NewWallet, ProvisionedWallet, Wallet, WalletUpdate, DEFAULT_CHAIN_TYPE};
