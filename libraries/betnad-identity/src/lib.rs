//! BetNad Identity
//!
//! Firebase Authentication adapter.
//!
//! # Features
//!
//! - **ID-token verification**: RS256 signature against Google's published keys,
//!   audience/issuer/expiry checks, keys cached for the advertised `max-age`
//! - **User lookup**: Identity Toolkit `accounts:lookup`, authorized with a
//!   service-account access token
//! - **Mapping**: `map_to_user` turns a provider record into a BetNad `User`
//!
//! # Example
//!
//! ```ignore
//! use betnad_core::IdentityProvider;
//! use betnad_identity::{FirebaseAuth, ServiceAccount};
//!
//! let auth = FirebaseAuth::new(service_account)?;
//! let claims = auth.verify_id_token(&id_token).await?;
//! let record = auth.get_user(&claims.uid).await?;
//! let user = betnad_identity::map_to_user(&record);
//! ```

mod access_token;
mod credentials;
mod firebase;
mod keys;
mod mapping;

pub use credentials::ServiceAccount;
pub use firebase::{FirebaseAuth, FirebaseEndpoints};
pub use mapping::map_to_user;
