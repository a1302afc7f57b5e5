//! Custody wallet persistence (`privy_wallets` collection)

use crate::error::Result;
use betnad_core::types::{NewWallet, SubjectId, Wallet, WalletUpdate};
use bson::{doc, oid::ObjectId, DateTime as BsonDateTime};
use chrono::Utc;
use mongodb::options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument};
use mongodb::{Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};

/// Collection name
pub const COLLECTION: &str = "privy_wallets";

/// Stored shape of a wallet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub privy_wallet_id: String,
    pub address: String,
    pub chain_type: String,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

impl From<WalletDocument> for Wallet {
    fn from(doc: WalletDocument) -> Self {
        Self {
            user_id: SubjectId::new(doc.user_id),
            privy_wallet_id: doc.privy_wallet_id,
            address: doc.address,
            chain_type: doc.chain_type,
            created_at: doc.created_at.to_chrono(),
            updated_at: doc.updated_at.to_chrono(),
        }
    }
}

fn collection(db: &Database) -> Collection<WalletDocument> {
    db.collection(COLLECTION)
}

/// Create the unique index on `userId` (one wallet per user)
pub async fn ensure_indexes(db: &Database) -> Result<()> {
    let index = IndexModel::builder()
        .keys(doc! { "userId": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build();

    collection(db).create_index(index, None).await?;
    Ok(())
}

/// Find the wallet owned by a user
pub async fn find_by_user_id(db: &Database, user_id: &SubjectId) -> Result<Option<Wallet>> {
    let doc = collection(db)
        .find_one(doc! { "userId": user_id.as_str() }, None)
        .await?;

    Ok(doc.map(Wallet::from))
}

/// Insert a new wallet
///
/// Fails with `StorageError::Duplicate` when the user already owns one.
pub async fn create(db: &Database, wallet: NewWallet) -> Result<Wallet> {
    let now = BsonDateTime::from_chrono(Utc::now());
    let doc = WalletDocument {
        id: None,
        user_id: wallet.user_id.into_inner(),
        privy_wallet_id: wallet.privy_wallet_id,
        address: wallet.address,
        chain_type: wallet.chain_type,
        created_at: now,
        updated_at: now,
    };

    collection(db).insert_one(&doc, None).await?;

    Ok(doc.into())
}

/// Apply a partial update and bump `updatedAt`
pub async fn update(
    db: &Database,
    user_id: &SubjectId,
    changes: WalletUpdate,
) -> Result<Option<Wallet>> {
    let mut set = doc! { "updatedAt": BsonDateTime::from_chrono(Utc::now()) };
    if let Some(privy_wallet_id) = changes.privy_wallet_id {
        set.insert("privyWalletId", privy_wallet_id);
    }
    if let Some(address) = changes.address {
        set.insert("address", address);
    }
    if let Some(chain_type) = changes.chain_type {
        set.insert("chainType", chain_type);
    }

    let options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();

    let doc = collection(db)
        .find_one_and_update(doc! { "userId": user_id.as_str() }, doc! { "$set": set }, options)
        .await?;

    Ok(doc.map(Wallet::from))
}

/// Delete the wallet owned by a user
pub async fn delete(db: &Database, user_id: &SubjectId) -> Result<bool> {
    let result = collection(db)
        .delete_one(doc! { "userId": user_id.as_str() }, None)
        .await?;

    Ok(result.deleted_count > 0)
}
