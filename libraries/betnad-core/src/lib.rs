//! BetNad Core
//!
//! Domain types, traits, and error handling shared by every BetNad crate.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `User`, `Wallet`, `SubjectId`, `DecodedToken`, `ProviderUser`
//! - **Core Traits**: `UserStore`, `WalletStore`, `IdentityProvider`, `WalletProvider`
//! - **Error Handling**: Unified `BetnadError` and `Result` types
//!
//! Adapters (MongoDB, Firebase, Privy) implement the traits in their own crates;
//! the server only ever sees the traits.
//!
//! # Example
//!
//! ```rust
//! use betnad_core::types::{SubjectId, User};
//! use chrono::Utc;
//!
//! let user = User::new(SubjectId::new("firebase-uid-1"), "alice@example.com", Utc::now());
//! assert!(user.wallet_address.is_none());
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{BetnadError, Result};
pub use traits::{IdentityProvider, UserStore, WalletProvider, WalletStore};
pub use types::{
    DecodedToken, NewWallet, ProviderUser, ProvisionedWallet, SubjectId, TwitterIdentity, User,
    Wallet, WalletUpdate,
};
