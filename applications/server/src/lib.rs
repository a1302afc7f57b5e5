//! BetNad Server Library
//!
//! HTTP API for sign-in with an identity-provider ID token, token checks and
//! custody-wallet provisioning.
//!
//! This library exposes the core components for testing purposes.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::{mask_secret, Environment, ServerConfig};
pub use error::{Result, ServerError};
pub use services::{AuthService, WalletService};
pub use state::AppState;
