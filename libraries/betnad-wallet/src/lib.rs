//! BetNad Wallet
//!
//! Client for the Privy server wallet API.
//!
//! # Features
//!
//! - **Provisioning**: create a custody wallet on a given chain
//! - **Lookup**: fetch a wallet by its Privy id
//!
//! `PrivyClient` implements `betnad_core::WalletProvider`, which is all the
//! server depends on.
//!
//! # Example
//!
//! ```ignore
//! use betnad_wallet::PrivyClient;
//!
//! let privy = PrivyClient::new(app_id, app_secret)?;
//! let wallet = privy.create_wallet("ethereum").await?;
//! println!("Provisioned {} on {}", wallet.address, wallet.chain_type);
//! ```

mod client;
mod error;
mod types;

pub use client::{PrivyClient, DEFAULT_BASE_URL};
pub use error::{PrivyError, Result};
pub use types::PrivyWallet;
