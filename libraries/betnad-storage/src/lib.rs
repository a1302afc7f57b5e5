//! BetNad Storage
//!
//! MongoDB persistence for users and custody wallets.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: `users` and `wallets` each own their collection,
//!   document shape and queries
//! - **Atomic upserts**: logins go through a single `findOneAndUpdate`
//! - **One client per process**: `MongoStorage` wraps the pooled driver client
//!   and is shared behind an `Arc`
//!
//! `InMemoryStorage` implements the same traits without a database.
//!
//! # Example
//!
//! ```rust,no_run
//! use betnad_core::{SubjectId, UserStore};
//! use betnad_storage::MongoStorage;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = MongoStorage::connect("mongodb://localhost:27017", "betnad").await?;
//! storage.ensure_indexes().await?;
//!
//! let user = storage.find_by_subject_id(&SubjectId::new("uid-1")).await?;
//! # Ok(())
//! # }
//! ```

mod context;
mod error;
mod memory;

// Vertical slices
pub mod users;
pub mod wallets;

pub use context::MongoStorage;
pub use error::StorageError;
pub use memory::InMemoryStorage;
